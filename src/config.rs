use std::env;
use std::net::SocketAddr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct AdminSeed {
    pub username: String,
    pub password: String,
}

/// Process configuration, read once in `main` from `.env` and the environment.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub secret: String,
    pub bind_addr: SocketAddr,
    pub token_ttl_hours: i64,
    pub admin_seed: Option<AdminSeed>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://inventory.db?mode=rwc".to_owned());
        let secret = env::var("SECRET").map_err(|_| ConfigError::Missing("SECRET"))?;
        if secret.is_empty() {
            return Err(ConfigError::Missing("SECRET"));
        }

        let bind_addr = parse_var("BIND_ADDR", "0.0.0.0:3000")?;
        let token_ttl_hours: i64 = parse_var("TOKEN_TTL_HOURS", "24")?;
        if token_ttl_hours <= 0 {
            return Err(ConfigError::Invalid {
                name: "TOKEN_TTL_HOURS",
                value: token_ttl_hours.to_string(),
            });
        }

        let admin_seed = match (env::var("ADMIN_USERNAME"), env::var("ADMIN_PASSWORD")) {
            (Ok(username), Ok(password)) if !username.is_empty() && !password.is_empty() => {
                Some(AdminSeed { username, password })
            }
            _ => None,
        };

        Ok(Self {
            database_url,
            secret,
            bind_addr,
            token_ttl_hours,
            admin_seed,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: &str) -> Result<T, ConfigError> {
    let value = env::var(name).unwrap_or_else(|_| default.to_owned());
    value
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}
