//! Command and callback dispatch
//!
//! Entry point for webhook updates. Commands interrupt any in-flight
//! conversation; plain text feeds the product wizard. Every reply goes out
//! through the notification channel, so tests drive this with the recording
//! channel.

use rust_decimal::Decimal;

use crate::bot::conversation::Conversation;
use crate::bot::tracker;
use crate::bot::update::{CallbackQuery, Message, TgUser, Update};
use crate::core::ServerState;
use crate::db::models::ItemCreate;
use crate::notify::{InlineButton, InlineKeyboard};
use crate::orders::{ClaimAction, CompleteAction, ConfirmAction, OrderAction, OrderError};
use crate::utils::AppError;
use shared::DeliveryMode;

/// Handle one webhook update. Never fails: user-facing errors become chat
/// replies, the rest is logged. The webhook route always answers 200 so
/// the Bot API does not redeliver.
pub async fn dispatch(state: &ServerState, update: Update) {
    if let Some(message) = update.message {
        handle_message(state, message).await;
    } else if let Some(query) = update.callback_query {
        handle_callback(state, query).await;
    } else {
        tracing::debug!(update_id = update.update_id, "ignoring unsupported update");
    }
}

async fn handle_message(state: &ServerState, message: Message) {
    let Some(user) = message.from else { return };
    let Some(text) = message.text else { return };
    let text = text.trim();
    if text.is_empty() {
        return;
    }

    if text.starts_with('/') {
        // A command always interrupts the wizard; /cancel words its reply
        // by whether anything was actually in flight.
        let interrupted = state.conversations.cancel(user.id);
        handle_command(state, &user, text, interrupted).await;
    } else if let Some(conversation) = state.conversations.take(user.id) {
        advance_wizard(state, &user, conversation, text).await;
    }
    // Plain text outside a conversation is ignored.
}

async fn handle_command(state: &ServerState, user: &TgUser, text: &str, interrupted: bool) {
    let mut parts = text.split_whitespace();
    let command = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();
    tracing::debug!(user_id = user.id, command, "bot command");

    match command {
        "/start" => start(state, user).await,
        "/help" => help(state, user).await,
        "/code" => issue_code(state, user).await,
        "/menu" => tracker::main_menu(state, user.id).await,
        "/search" => tracker::search(state, user, &args).await,
        "/cancel" => {
            let reply = if interrupted {
                "Cancelled."
            } else {
                "Nothing to cancel."
            };
            state.channel.send(user.id, reply).await;
        }
        "/add_product" => add_product(state, user).await,
        "/add" => credit(state, user, &args).await,
        "/توليد" => generate_keys(state, user, &args).await,
        "/شحن" => redeem(state, user, &args).await,
        "/add_admin" => add_admin(state, user, &args).await,
        "/remove_admin" => remove_admin(state, user, &args).await,
        "/list_admins" => list_admins(state, user).await,
        _ => {
            state
                .channel
                .send(user.id, "Unknown command. Send /help for the list.")
                .await;
        }
    }
}

async fn start(state: &ServerState, user: &TgUser) {
    if let Err(e) = state.users.get_or_create(user.id, &user.display_name()).await {
        tracing::warn!(user_id = user.id, error = %e, "account creation on /start failed");
    }
    let keyboard = InlineKeyboard::default().row(vec![InlineButton::link(
        "🛍 Open the store",
        state.config.site_url.clone(),
    )]);
    state
        .channel
        .send_with_keyboard(
            user.id,
            "Welcome to the store! Browse items on the site, top up with /شحن, \
             and log in to the site with /code.",
            keyboard,
        )
        .await;
}

async fn help(state: &ServerState, user: &TgUser) {
    let mut text = String::from(
        "Commands:\n\
         /start - welcome and store link\n\
         /code - site login code\n\
         /شحن <code> - redeem a charge key\n\
         /menu - operations and subscription tracker\n\
         /search <name> - find a tracked client\n\
         /help - this list",
    );
    if state.admins.is_admin(user.id).await {
        text.push_str(
            "\n\nAdmin:\n\
             /add_product - add an item (wizard)\n\
             /add <user_id> <amount> - credit a balance\n\
             /توليد <amount> [count] - mint charge keys\n\
             /add_admin <user_id> [name]\n\
             /remove_admin <user_id>\n\
             /list_admins",
        );
    }
    state.channel.send(user.id, &text).await;
}

async fn issue_code(state: &ServerState, user: &TgUser) {
    let code = state.verify_codes.issue(user.id, &user.display_name());
    state
        .channel
        .send(
            user.id,
            &format!("🔑 Your login code: {code}\nEnter it on the site within 5 minutes."),
        )
        .await;
}

async fn add_product(state: &ServerState, user: &TgUser) {
    if !require_admin(state, user).await {
        return;
    }
    state.conversations.start(user.id, Conversation::AddProductName);
    state
        .channel
        .send(user.id, "📝 New item. Send the item name (or /cancel).")
        .await;
}

async fn credit(state: &ServerState, user: &TgUser, args: &[&str]) {
    if !require_admin(state, user).await {
        return;
    }
    let (Some(target), Some(amount)) = (
        args.first().and_then(|a| a.parse::<i64>().ok()),
        args.get(1).and_then(|a| a.parse::<Decimal>().ok()),
    ) else {
        state
            .channel
            .send(user.id, "Usage: /add <user_id> <amount>")
            .await;
        return;
    };
    match state.ledger.credit(target, "", amount).await {
        Ok(new_balance) => {
            state
                .channel
                .send(
                    user.id,
                    &format!("✅ Credited {amount} to {target}. New balance: {new_balance}"),
                )
                .await;
            state
                .channel
                .send(target, &format!("💳 Your balance was topped up by {amount}."))
                .await;
        }
        Err(e) => reply_error(state, user.id, e).await,
    }
}

async fn generate_keys(state: &ServerState, user: &TgUser, args: &[&str]) {
    if !require_admin(state, user).await {
        return;
    }
    let Some(amount) = args.first().and_then(|a| a.parse::<Decimal>().ok()) else {
        state
            .channel
            .send(user.id, "Usage: /توليد <amount> [count]")
            .await;
        return;
    };
    let count = args
        .get(1)
        .and_then(|a| a.parse::<u32>().ok())
        .unwrap_or(1);
    match state.charge_keys.generate(amount, count).await {
        Ok(codes) => {
            let text = format!(
                "🔐 Minted {} key(s) worth {amount} each:\n{}",
                codes.len(),
                codes.join("\n")
            );
            state.channel.send(user.id, &text).await;
        }
        Err(e) => reply_error(state, user.id, e).await,
    }
}

async fn redeem(state: &ServerState, user: &TgUser, args: &[&str]) {
    let Some(code) = args.first() else {
        state.channel.send(user.id, "Usage: /شحن <code>").await;
        return;
    };
    match state
        .charge_keys
        .redeem(code, user.id, &user.display_name())
        .await
    {
        Ok(amount) => {
            let balance = state
                .ledger
                .get_balance(user.id)
                .await
                .map(|b| b.to_string())
                .unwrap_or_else(|_| "unavailable".into());
            state
                .channel
                .send(
                    user.id,
                    &format!("✅ Key redeemed: +{amount}. Balance: {balance}"),
                )
                .await;
        }
        Err(AppError::NotFound(_)) => {
            state.channel.send(user.id, "❌ Unknown charge key.").await;
        }
        Err(AppError::AlreadyUsed(_)) => {
            state
                .channel
                .send(user.id, "❌ This key was already used.")
                .await;
        }
        Err(e) => reply_error(state, user.id, e).await,
    }
}

async fn add_admin(state: &ServerState, user: &TgUser, args: &[&str]) {
    if !require_admin(state, user).await {
        return;
    }
    let Some(target) = args.first().and_then(|a| a.parse::<i64>().ok()) else {
        state
            .channel
            .send(user.id, "Usage: /add_admin <user_id> [name]")
            .await;
        return;
    };
    let name = args.get(1).copied().unwrap_or("");
    match state.admins.add(target, name, user.id).await {
        Ok(_) => {
            state
                .channel
                .send(user.id, &format!("✅ {target} is now an admin."))
                .await;
            state
                .channel
                .send(target, "You were added as a store admin.")
                .await;
        }
        Err(e) => reply_error(state, user.id, e).await,
    }
}

async fn remove_admin(state: &ServerState, user: &TgUser, args: &[&str]) {
    if !require_admin(state, user).await {
        return;
    }
    let Some(target) = args.first().and_then(|a| a.parse::<i64>().ok()) else {
        state
            .channel
            .send(user.id, "Usage: /remove_admin <user_id>")
            .await;
        return;
    };
    match state.admins.remove(target).await {
        Ok(true) => {
            state
                .channel
                .send(user.id, &format!("✅ {target} is no longer an admin."))
                .await;
        }
        Ok(false) => {
            state
                .channel
                .send(user.id, &format!("{target} was not an admin."))
                .await;
        }
        Err(e) => reply_error(state, user.id, e).await,
    }
}

async fn list_admins(state: &ServerState, user: &TgUser) {
    if !require_admin(state, user).await {
        return;
    }
    match state.admins.list().await {
        Ok(admins) => {
            let mut text = format!("👥 Admins:\n{} (owner)", state.admins.owner_id());
            for admin in admins {
                if admin.user_id != state.admins.owner_id() {
                    text.push_str(&format!("\n{} {}", admin.user_id, admin.name));
                }
            }
            state.channel.send(user.id, &text).await;
        }
        Err(e) => reply_error(state, user.id, e).await,
    }
}

// ========== Product wizard ==========

async fn advance_wizard(
    state: &ServerState,
    user: &TgUser,
    conversation: Conversation,
    input: &str,
) {
    match conversation {
        Conversation::AddProductName => {
            state.conversations.start(
                user.id,
                Conversation::AddProductPrice {
                    name: input.to_string(),
                },
            );
            state.channel.send(user.id, "💰 Price?").await;
        }
        Conversation::AddProductPrice { name } => match input.parse::<Decimal>() {
            Ok(price) if price >= Decimal::ZERO => {
                state
                    .conversations
                    .start(user.id, Conversation::AddProductCategory { name, price });
                let hint = category_hint(state).await;
                state
                    .channel
                    .send(user.id, &format!("🗂 Category?{hint}"))
                    .await;
            }
            _ => {
                state
                    .conversations
                    .start(user.id, Conversation::AddProductPrice { name });
                state
                    .channel
                    .send(user.id, "Send a non-negative number for the price.")
                    .await;
            }
        },
        Conversation::AddProductCategory { name, price } => {
            state.conversations.start(
                user.id,
                Conversation::AddProductPayload {
                    name,
                    price,
                    category: input.to_string(),
                },
            );
            state
                .channel
                .send(
                    user.id,
                    "🔒 Hidden payload (credentials etc., shown to the buyer after purchase)?",
                )
                .await;
        }
        Conversation::AddProductPayload {
            name,
            price,
            category,
        } => {
            state.conversations.start(
                user.id,
                Conversation::AddProductDelivery {
                    name,
                    price,
                    category,
                    payload: input.to_string(),
                },
            );
            state
                .channel
                .send(
                    user.id,
                    "🚚 Delivery mode: `instant`, `manual`, or `-` for the category default?",
                )
                .await;
        }
        Conversation::AddProductDelivery {
            name,
            price,
            category,
            payload,
        } => {
            let chosen = match input.to_lowercase().as_str() {
                "instant" => Some(DeliveryMode::Instant),
                "manual" => Some(DeliveryMode::Manual),
                "-" => None,
                _ => {
                    state.conversations.start(
                        user.id,
                        Conversation::AddProductDelivery {
                            name,
                            price,
                            category,
                            payload,
                        },
                    );
                    state
                        .channel
                        .send(user.id, "Send `instant`, `manual`, or `-`.")
                        .await;
                    return;
                }
            };
            finish_wizard(state, user, name, price, category, payload, chosen).await;
        }
        // Tracker wizards (operations, subscriptions, clients) live in
        // their own module.
        other => tracker::advance(state, user, other, input).await,
    }
}

async fn finish_wizard(
    state: &ServerState,
    user: &TgUser,
    name: String,
    price: Decimal,
    category: String,
    payload: String,
    delivery_mode: Option<DeliveryMode>,
) {
    let default_mode = match state.categories.find_by_name(&category).await {
        Ok(Some(cat)) => cat.delivery_mode_default,
        Ok(None) => DeliveryMode::Manual,
        Err(e) => {
            tracing::warn!(category, error = %e, "category lookup failed, defaulting to manual");
            DeliveryMode::Manual
        }
    };
    let create = ItemCreate {
        name,
        price,
        seller_id: user.id,
        seller_name: user.display_name(),
        category,
        hidden_payload: payload,
        delivery_mode,
    };
    match state.items.create(create, default_mode).await {
        Ok(item) => {
            state.mirror.forget_item(&item.key());
            state
                .channel
                .send(
                    user.id,
                    &format!(
                        "✅ Item listed: {} ({}, {}) id {}",
                        item.name,
                        item.price,
                        item.delivery_mode.as_str(),
                        item.key()
                    ),
                )
                .await;
        }
        Err(e) => {
            state
                .channel
                .send(user.id, &format!("❌ Could not create the item: {e}"))
                .await;
        }
    }
}

async fn category_hint(state: &ServerState) -> String {
    match state.categories.find_all().await {
        Ok(categories) if !categories.is_empty() => {
            let names: Vec<String> = categories.into_iter().map(|c| c.name).collect();
            format!(" Existing: {}", names.join(", "))
        }
        _ => String::new(),
    }
}

// ========== Callback queries ==========

async fn handle_callback(state: &ServerState, query: CallbackQuery) {
    let Some(data) = query.data.as_deref() else {
        state.channel.answer_callback(&query.id, "").await;
        return;
    };
    if tracker::handle_callback(state, &query, data).await {
        return;
    }
    let ctx = state.order_context();

    let result: Result<String, OrderError> = if let Some(order_id) = data.strip_prefix("claim_") {
        ClaimAction {
            order_id: order_id.to_string(),
            admin_id: query.from.id,
        }
        .execute(&ctx)
        .await
        .map(|_| "Order claimed, payload sent to you.".to_string())
    } else if let Some(order_id) = data.strip_prefix("complete_") {
        CompleteAction {
            order_id: order_id.to_string(),
            admin_id: query.from.id,
        }
        .execute(&ctx)
        .await
        .map(|_| "Order completed, seller credited.".to_string())
    } else if let Some(order_id) = data.strip_prefix("confirm_") {
        ConfirmAction {
            order_id: order_id.to_string(),
            buyer_id: query.from.id,
        }
        .execute(&ctx)
        .await
        .map(|_| "Receipt confirmed, enjoy!".to_string())
    } else {
        tracing::debug!(data, "unknown callback data");
        state.channel.answer_callback(&query.id, "").await;
        return;
    };

    match result {
        Ok(toast) => state.channel.answer_callback(&query.id, &toast).await,
        Err(e) => {
            tracing::info!(user_id = query.from.id, data, error = %e, "callback action rejected");
            state.channel.answer_callback(&query.id, &e.to_string()).await;
        }
    }
}

// ========== Helpers ==========

async fn require_admin(state: &ServerState, user: &TgUser) -> bool {
    if state.admins.is_admin(user.id).await {
        return true;
    }
    state
        .channel
        .send(user.id, "⛔ This command is for admins.")
        .await;
    false
}

async fn reply_error(state: &ServerState, user_id: i64, err: AppError) {
    tracing::warn!(user_id, error = %err, "bot command failed");
    state
        .channel
        .send(user_id, &format!("❌ {err}"))
        .await;
}
