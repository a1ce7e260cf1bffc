use std::env;

/// Runtime settings, read once at startup. `DATABASE_URL` is required;
/// everything else has a default or is optional.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub contact_relay_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        let database_url = env::var("DATABASE_URL")?;
        let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
        Ok(Config {
            database_url,
            bind_addr: format!("0.0.0.0:{port}"),
            admin_email: env::var("ADMIN_EMAIL").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
            contact_relay_url: env::var("CONTACT_RELAY_URL").ok(),
        })
    }
}
