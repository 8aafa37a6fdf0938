//! Operations and subscription tracker
//!
//! Menu-driven bookkeeping surface: a per-user operations ledger and
//! subscription emails with a capped number of tracked clients under each.
//! Everything is scoped to the Telegram user driving the menu; there is no
//! admin gate here.

use crate::bot::conversation::Conversation;
use crate::bot::update::{CallbackQuery, TgUser};
use crate::core::ServerState;
use crate::db::models::SubscriptionRecord;
use crate::db::repository::subscription::DEFAULT_MAX_CLIENTS;
use crate::notify::{InlineButton, InlineKeyboard};

/// `/menu` entry point and the `back_main` target.
pub async fn main_menu(state: &ServerState, user_id: i64) {
    let keyboard = InlineKeyboard::default()
        .row(vec![InlineButton::callback(
            "📋 Operations",
            "menu_operations",
        )])
        .row(vec![InlineButton::callback(
            "📧 Subscriptions",
            "menu_subscriptions",
        )]);
    state
        .channel
        .send_with_keyboard(user_id, "What would you like to manage?", keyboard)
        .await;
}

/// `/search <name>` - find tracked clients across the user's subscriptions.
pub async fn search(state: &ServerState, user: &TgUser, args: &[&str]) {
    if args.is_empty() {
        state.channel.send(user.id, "Usage: /search <name>").await;
        return;
    }
    let term = args.join(" ");
    match state.subscriptions.search_clients(user.id, &term).await {
        Ok(hits) if hits.is_empty() => {
            state
                .channel
                .send(user.id, &format!("🔍 No tracked client matches '{term}'."))
                .await;
        }
        Ok(hits) => {
            let mut text = format!("🔍 {} match(es) for '{term}':\n", hits.len());
            for hit in hits {
                let label = if hit.subscription_type.is_empty() {
                    hit.email.clone()
                } else {
                    format!("{} / {}", hit.subscription_type, hit.email)
                };
                text.push_str(&format!(
                    "\n👤 {}\n   📧 {}\n   📱 {}\n   📅 {} to {}\n",
                    hit.client.name, label, hit.client.phone, hit.client.start_date,
                    hit.client.end_date
                ));
            }
            state.channel.send(user.id, &text).await;
        }
        Err(e) => {
            tracing::warn!(user_id = user.id, error = %e, "client search failed");
            state
                .channel
                .send(user.id, "❌ Search is unavailable right now, try again.")
                .await;
        }
    }
}

/// Handle a tracker callback. Returns false when the data belongs to
/// another surface (order buttons), leaving it to the caller.
pub async fn handle_callback(state: &ServerState, query: &CallbackQuery, data: &str) -> bool {
    let user_id = query.from.id;
    let toast = match data {
        "back_main" => {
            state.conversations.cancel(user_id);
            main_menu(state, user_id).await;
            String::new()
        }
        "menu_operations" => {
            let keyboard = InlineKeyboard::default()
                .row(vec![InlineButton::callback("➕ New operation", "op_create")])
                .row(vec![InlineButton::callback("📄 List operations", "op_list")])
                .row(vec![InlineButton::callback("🔙 Back", "back_main")]);
            state
                .channel
                .send_with_keyboard(user_id, "📋 Operations", keyboard)
                .await;
            String::new()
        }
        "menu_subscriptions" => {
            let keyboard = InlineKeyboard::default()
                .row(vec![InlineButton::callback(
                    "➕ New subscription",
                    "email_create",
                )])
                .row(vec![InlineButton::callback(
                    "📋 List subscriptions",
                    "email_list",
                )])
                .row(vec![InlineButton::callback("🔙 Back", "back_main")]);
            state
                .channel
                .send_with_keyboard(user_id, "📧 Subscriptions", keyboard)
                .await;
            String::new()
        }
        "op_create" => {
            state.conversations.start(user_id, Conversation::OperationTitle);
            state
                .channel
                .send(user_id, "📝 Send the operation title (or /cancel).")
                .await;
            String::new()
        }
        "op_list" => {
            send_operation_list(state, user_id).await;
            String::new()
        }
        "email_create" => {
            state.conversations.start(user_id, Conversation::SubscriptionType);
            state
                .channel
                .send(
                    user_id,
                    "📌 Which service is this for (Netflix, Spotify, ...)?",
                )
                .await;
            String::new()
        }
        "email_list" => {
            send_subscription_list(state, user_id).await;
            String::new()
        }
        _ => {
            if let Some(id) = data.strip_prefix("op_view_") {
                view_operation(state, user_id, id).await
            } else if let Some(id) = data.strip_prefix("op_delete_") {
                delete_operation(state, user_id, id).await
            } else if let Some(id) = data.strip_prefix("email_view_") {
                send_subscription_view(state, user_id, id).await
            } else if let Some(id) = data.strip_prefix("email_delete_") {
                delete_subscription(state, user_id, id).await
            } else if let Some(id) = data.strip_prefix("client_add_") {
                start_client_wizard(state, user_id, id).await
            } else if let Some(rest) = data.strip_prefix("client_del_") {
                match rest.split_once('_') {
                    Some((sub_id, client_id)) => {
                        delete_client(state, user_id, sub_id, client_id).await
                    }
                    None => return false,
                }
            } else {
                return false;
            }
        }
    };
    state.channel.answer_callback(&query.id, &toast).await;
    true
}

/// Advance a tracker wizard with the user's next input.
pub async fn advance(state: &ServerState, user: &TgUser, conversation: Conversation, input: &str) {
    match conversation {
        Conversation::OperationTitle => {
            state.conversations.start(
                user.id,
                Conversation::OperationDetails {
                    title: input.to_string(),
                },
            );
            state
                .channel
                .send(user.id, "📝 Details? Send `-` to skip.")
                .await;
        }
        Conversation::OperationDetails { title } => {
            let details = if input == "-" { "" } else { input };
            match state.operations.create(user.id, &title, details).await {
                Ok(_) => {
                    let keyboard = InlineKeyboard::default()
                        .row(vec![InlineButton::callback("📄 List operations", "op_list")])
                        .row(vec![InlineButton::callback("🏠 Main menu", "back_main")]);
                    state
                        .channel
                        .send_with_keyboard(
                            user.id,
                            &format!("✅ Operation recorded: {title}"),
                            keyboard,
                        )
                        .await;
                }
                Err(e) => {
                    tracing::warn!(user_id = user.id, error = %e, "operation create failed");
                    state
                        .channel
                        .send(user.id, "❌ Could not record the operation, try again.")
                        .await;
                }
            }
        }
        Conversation::SubscriptionType => {
            state.conversations.start(
                user.id,
                Conversation::SubscriptionEmail {
                    subscription_type: input.to_string(),
                },
            );
            state.channel.send(user.id, "📧 Subscription email?").await;
        }
        Conversation::SubscriptionEmail { subscription_type } => {
            match state
                .subscriptions
                .create(user.id, input, &subscription_type, DEFAULT_MAX_CLIENTS)
                .await
            {
                Ok(sub) => {
                    let keyboard = InlineKeyboard::default()
                        .row(vec![InlineButton::callback(
                            "👁 View subscription",
                            format!("email_view_{}", sub.key()),
                        )])
                        .row(vec![InlineButton::callback("🏠 Main menu", "back_main")]);
                    state
                        .channel
                        .send_with_keyboard(
                            user.id,
                            &format!("✅ Subscription added: {} ({})", sub.label(), sub.email),
                            keyboard,
                        )
                        .await;
                }
                Err(e) => {
                    tracing::warn!(user_id = user.id, error = %e, "subscription create failed");
                    state
                        .channel
                        .send(user.id, "❌ Could not add the subscription, try again.")
                        .await;
                }
            }
        }
        Conversation::ClientName { subscription_id } => {
            state.conversations.start(
                user.id,
                Conversation::ClientPhone {
                    subscription_id,
                    name: input.to_string(),
                },
            );
            state
                .channel
                .send(user.id, "📱 Phone number or Telegram handle?")
                .await;
        }
        Conversation::ClientPhone {
            subscription_id,
            name,
        } => {
            state.conversations.start(
                user.id,
                Conversation::ClientStart {
                    subscription_id,
                    name,
                    phone: input.to_string(),
                },
            );
            state
                .channel
                .send(user.id, "📅 Start date (e.g. 2026-08-26)?")
                .await;
        }
        Conversation::ClientStart {
            subscription_id,
            name,
            phone,
        } => {
            state.conversations.start(
                user.id,
                Conversation::ClientEnd {
                    subscription_id,
                    name,
                    phone,
                    start_date: input.to_string(),
                },
            );
            state
                .channel
                .send(user.id, "📅 End date (e.g. 2026-09-26)?")
                .await;
        }
        Conversation::ClientEnd {
            subscription_id,
            name,
            phone,
            start_date,
        } => {
            match state
                .subscriptions
                .add_client(&subscription_id, &name, &phone, &start_date, input)
                .await
            {
                Ok(client) => {
                    let keyboard = InlineKeyboard::default()
                        .row(vec![InlineButton::callback(
                            "👁 View subscription",
                            format!("email_view_{subscription_id}"),
                        )])
                        .row(vec![InlineButton::callback(
                            "➕ Add another client",
                            format!("client_add_{subscription_id}"),
                        )])
                        .row(vec![InlineButton::callback("🏠 Main menu", "back_main")]);
                    state
                        .channel
                        .send_with_keyboard(
                            user.id,
                            &format!(
                                "✅ Client added:\n👤 {}\n📱 {}\n📅 {} to {}",
                                client.name, client.phone, client.start_date, client.end_date
                            ),
                            keyboard,
                        )
                        .await;
                }
                Err(e) => {
                    tracing::warn!(user_id = user.id, error = %e, "client create failed");
                    state
                        .channel
                        .send(user.id, "❌ Could not add the client, try again.")
                        .await;
                }
            }
        }
        // Product wizard states are dispatched before delegation.
        _ => {}
    }
}

// ========== Rendering and ownership-guarded mutations ==========

async fn send_operation_list(state: &ServerState, user_id: i64) {
    match state.operations.find_by_user(user_id).await {
        Ok(operations) if operations.is_empty() => {
            let keyboard = InlineKeyboard::default()
                .row(vec![InlineButton::callback("➕ New operation", "op_create")])
                .row(vec![InlineButton::callback("🔙 Back", "menu_operations")]);
            state
                .channel
                .send_with_keyboard(user_id, "📭 No operations recorded.", keyboard)
                .await;
        }
        Ok(operations) => {
            let mut keyboard = InlineKeyboard::default();
            for op in &operations {
                keyboard = keyboard.row(vec![InlineButton::callback(
                    format!("📌 {}", op.title),
                    format!("op_view_{}", op.key()),
                )]);
            }
            keyboard = keyboard.row(vec![InlineButton::callback("🔙 Back", "menu_operations")]);
            state
                .channel
                .send_with_keyboard(user_id, "📋 Your operations:", keyboard)
                .await;
        }
        Err(e) => {
            tracing::warn!(user_id, error = %e, "operation list failed");
            state
                .channel
                .send(user_id, "❌ Could not load operations, try again.")
                .await;
        }
    }
}

async fn view_operation(state: &ServerState, user_id: i64, op_id: &str) -> String {
    match state.operations.find_by_id(op_id).await {
        Ok(Some(op)) if op.user_id == user_id => {
            let mut text = format!("📌 {}", op.title);
            if !op.details.is_empty() {
                text.push_str(&format!("\n\n📝 {}", op.details));
            }
            let keyboard = InlineKeyboard::default()
                .row(vec![InlineButton::callback(
                    "🗑 Delete",
                    format!("op_delete_{op_id}"),
                )])
                .row(vec![InlineButton::callback("🔙 Back", "op_list")]);
            state
                .channel
                .send_with_keyboard(user_id, &text, keyboard)
                .await;
            String::new()
        }
        Ok(_) => "Operation not found.".into(),
        Err(e) => {
            tracing::warn!(user_id, op_id, error = %e, "operation view failed");
            "Store error, try again.".into()
        }
    }
}

async fn delete_operation(state: &ServerState, user_id: i64, op_id: &str) -> String {
    // Ownership check before the delete; ids arrive from callback data.
    match state.operations.find_by_id(op_id).await {
        Ok(Some(op)) if op.user_id == user_id => match state.operations.delete(op_id).await {
            Ok(_) => {
                send_operation_list(state, user_id).await;
                "✅ Operation deleted.".into()
            }
            Err(e) => {
                tracing::warn!(user_id, op_id, error = %e, "operation delete failed");
                "Store error, try again.".into()
            }
        },
        Ok(_) => "Operation not found.".into(),
        Err(e) => {
            tracing::warn!(user_id, op_id, error = %e, "operation delete failed");
            "Store error, try again.".into()
        }
    }
}

async fn send_subscription_list(state: &ServerState, user_id: i64) {
    match state.subscriptions.find_by_user(user_id).await {
        Ok(subscriptions) if subscriptions.is_empty() => {
            let keyboard = InlineKeyboard::default()
                .row(vec![InlineButton::callback(
                    "➕ New subscription",
                    "email_create",
                )])
                .row(vec![InlineButton::callback("🔙 Back", "menu_subscriptions")]);
            state
                .channel
                .send_with_keyboard(user_id, "📭 No subscriptions recorded.", keyboard)
                .await;
        }
        Ok(subscriptions) => {
            let mut keyboard = InlineKeyboard::default();
            for sub in &subscriptions {
                let count = state
                    .subscriptions
                    .count_clients(&sub.key())
                    .await
                    .unwrap_or(0);
                keyboard = keyboard.row(vec![InlineButton::callback(
                    format!("📌 {} ({count} clients)", sub.label()),
                    format!("email_view_{}", sub.key()),
                )]);
            }
            keyboard = keyboard.row(vec![InlineButton::callback("🔙 Back", "menu_subscriptions")]);
            state
                .channel
                .send_with_keyboard(user_id, "📧 Your subscriptions:", keyboard)
                .await;
        }
        Err(e) => {
            tracing::warn!(user_id, error = %e, "subscription list failed");
            state
                .channel
                .send(user_id, "❌ Could not load subscriptions, try again.")
                .await;
        }
    }
}

async fn owned_subscription(
    state: &ServerState,
    user_id: i64,
    sub_id: &str,
) -> Result<Option<SubscriptionRecord>, String> {
    match state.subscriptions.find_by_id(sub_id).await {
        Ok(Some(sub)) if sub.user_id == user_id => Ok(Some(sub)),
        Ok(_) => Ok(None),
        Err(e) => {
            tracing::warn!(user_id, sub_id, error = %e, "subscription lookup failed");
            Err("Store error, try again.".into())
        }
    }
}

async fn send_subscription_view(state: &ServerState, user_id: i64, sub_id: &str) -> String {
    let sub = match owned_subscription(state, user_id, sub_id).await {
        Ok(Some(sub)) => sub,
        Ok(None) => return "Subscription not found.".into(),
        Err(toast) => return toast,
    };
    let clients = match state.subscriptions.clients_of(sub_id).await {
        Ok(clients) => clients,
        Err(e) => {
            tracing::warn!(user_id, sub_id, error = %e, "client list failed");
            return "Store error, try again.".into();
        }
    };

    let mut text = format!(
        "📌 {}\n📧 {}\n👥 Clients: {}/{}\n",
        sub.label(),
        sub.email,
        clients.len(),
        sub.max_clients
    );
    for (i, client) in clients.iter().enumerate() {
        text.push_str(&format!(
            "\n{}. {}\n   📱 {}\n   📅 {} to {}\n",
            i + 1,
            client.name,
            client.phone,
            client.start_date,
            client.end_date
        ));
    }

    let mut keyboard = InlineKeyboard::default().row(vec![InlineButton::callback(
        "➕ Add client",
        format!("client_add_{sub_id}"),
    )]);
    for client in &clients {
        keyboard = keyboard.row(vec![InlineButton::callback(
            format!("🗑 Remove {}", client.name),
            format!("client_del_{}_{}", sub_id, client.key()),
        )]);
    }
    keyboard = keyboard
        .row(vec![InlineButton::callback(
            "🗑 Delete subscription",
            format!("email_delete_{sub_id}"),
        )])
        .row(vec![InlineButton::callback("🔙 Back", "email_list")]);
    state
        .channel
        .send_with_keyboard(user_id, &text, keyboard)
        .await;
    String::new()
}

async fn delete_subscription(state: &ServerState, user_id: i64, sub_id: &str) -> String {
    match owned_subscription(state, user_id, sub_id).await {
        Ok(Some(_)) => match state.subscriptions.delete(sub_id).await {
            Ok(_) => {
                send_subscription_list(state, user_id).await;
                "✅ Subscription and its clients removed.".into()
            }
            Err(e) => {
                tracing::warn!(user_id, sub_id, error = %e, "subscription delete failed");
                "Store error, try again.".into()
            }
        },
        Ok(None) => "Subscription not found.".into(),
        Err(toast) => toast,
    }
}

async fn start_client_wizard(state: &ServerState, user_id: i64, sub_id: &str) -> String {
    let sub = match owned_subscription(state, user_id, sub_id).await {
        Ok(Some(sub)) => sub,
        Ok(None) => return "Subscription not found.".into(),
        Err(toast) => return toast,
    };
    match state.subscriptions.count_clients(sub_id).await {
        Ok(count) if count as u32 >= sub.max_clients => {
            format!("❌ Client limit reached ({} per subscription).", sub.max_clients)
        }
        Ok(_) => {
            state.conversations.start(
                user_id,
                Conversation::ClientName {
                    subscription_id: sub_id.to_string(),
                },
            );
            state.channel.send(user_id, "👤 Client name?").await;
            String::new()
        }
        Err(e) => {
            tracing::warn!(user_id, sub_id, error = %e, "client count failed");
            "Store error, try again.".into()
        }
    }
}

async fn delete_client(
    state: &ServerState,
    user_id: i64,
    sub_id: &str,
    client_id: &str,
) -> String {
    match owned_subscription(state, user_id, sub_id).await {
        Ok(Some(_)) => match state.subscriptions.delete_client(client_id).await {
            Ok(true) => {
                send_subscription_view(state, user_id, sub_id).await;
                "✅ Client removed.".into()
            }
            Ok(false) => "Client not found.".into(),
            Err(e) => {
                tracing::warn!(user_id, client_id, error = %e, "client delete failed");
                "Store error, try again.".into()
            }
        },
        Ok(None) => "Subscription not found.".into(),
        Err(toast) => toast,
    }
}
