use std::sync::Arc;

use souq_server::notify::TelegramChannel;
use souq_server::{Config, Server, ServerState, init_logger_with_file, print_banner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment and logging
    dotenv::dotenv().ok();
    let config = Config::from_env();
    std::fs::create_dir_all(&config.data_dir)?;
    init_logger_with_file(Some(&config.log_level), Some(&config.data_dir));

    print_banner();
    tracing::info!("souq server starting");

    // 2. State: store, services, Telegram transport
    let channel = Arc::new(TelegramChannel::new(config.bot_token.clone()));
    let state = ServerState::initialize_from_config(config.clone(), channel).await?;

    // 3. HTTP server (registers the webhook on startup)
    let server = Server::new(config, state);
    server.run().await?;

    Ok(())
}
