/// Server configuration - all knobs for the marketplace node
///
/// # Environment variables
///
/// Every setting can be overridden through environment variables:
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | BOT_TOKEN | (empty) | Telegram bot token; empty disables outbound sends |
/// | ADMIN_ID | 0 | Owner Telegram id, always in the admin set |
/// | SITE_URL | http://localhost:3000 | Public storefront URL (webhook base) |
/// | SECRET_KEY | (generated) | Session signing key, at least 32 bytes |
/// | ADMIN_PASS | (empty) | Password guarding /api/admin/* |
/// | PORT | 3000 | HTTP listen port |
/// | DATA_DIR | ./data | Working directory for the embedded store and logs |
/// | LOG_LEVEL | info | Tracing level filter |
///
/// # Example
///
/// ```ignore
/// DATA_DIR=/var/lib/souq PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot token
    pub bot_token: String,
    /// Owner admin Telegram id (seed of the admin set)
    pub admin_id: i64,
    /// Public site URL, used to register the bot webhook
    pub site_url: String,
    /// Session cookie signing key
    pub secret_key: String,
    /// Admin password for the HTTP admin API
    pub admin_pass: String,
    /// HTTP listen port
    pub http_port: u16,
    /// Working directory for the embedded store
    pub data_dir: String,
    /// Log level: trace | debug | info | warn | error
    pub log_level: String,
    /// Session lifetime in minutes (sliding)
    pub session_minutes: i64,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults when unset.
    pub fn from_env() -> Self {
        Self {
            bot_token: std::env::var("BOT_TOKEN").unwrap_or_default(),
            admin_id: std::env::var("ADMIN_ID")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            site_url: std::env::var("SITE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            secret_key: std::env::var("SECRET_KEY")
                .ok()
                .filter(|k| k.len() >= 32)
                .unwrap_or_else(generated_secret),
            admin_pass: std::env::var("ADMIN_PASS").unwrap_or_default(),
            http_port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            session_minutes: 30,
        }
    }
}

/// Generate a process-local signing key when SECRET_KEY is unset or too
/// short. Sessions then survive only until restart, which is acceptable for
/// development; production deployments must set SECRET_KEY.
fn generated_secret() -> String {
    use rand::Rng;
    tracing::warn!("SECRET_KEY unset or shorter than 32 bytes, using a process-local key");
    let mut rng = rand::thread_rng();
    (0..48)
        .map(|_| rng.sample(rand::distributions::Alphanumeric) as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_secret_is_long_enough() {
        assert!(generated_secret().len() >= 32);
    }
}
