use crate::auth::DEFAULT_TOKEN_TTL;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Service configuration
///
/// Every flag can also be supplied through its environment variable.
#[derive(Clone, Parser)]
#[command(name = "filmrank")]
#[command(about = "Ranked film list served over HTTP")]
pub struct AppConfig {
    /// Address to listen on
    #[arg(long, env = "FILMRANK_BIND_ADDR", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// JSON document holding the film collection
    #[arg(long, env = "FILMRANK_FILMS_PATH", default_value = "top250.json")]
    pub films_path: PathBuf,

    /// JSON document holding manager accounts
    #[arg(long, env = "FILMRANK_ACCOUNTS_PATH", default_value = "manager.json")]
    pub accounts_path: PathBuf,

    /// Secret used to sign bearer tokens
    #[arg(long, env = "FILMRANK_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Bearer token lifetime in seconds
    #[arg(long, env = "FILMRANK_TOKEN_TTL_SECS", default_value_t = DEFAULT_TOKEN_TTL.as_secs())]
    pub token_ttl_secs: u64,

    /// bcrypt work factor for new password hashes
    #[arg(
        long,
        env = "FILMRANK_BCRYPT_COST",
        default_value_t = 10,
        value_parser = clap::value_parser!(u32).range(4..=31)
    )]
    pub bcrypt_cost: u32,

    /// Serve the film routes without requiring a bearer token
    #[arg(long, env = "FILMRANK_NO_AUTH")]
    pub no_auth: bool,
}

impl AppConfig {
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    pub fn require_auth(&self) -> bool {
        !self.no_auth
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind", &self.bind)
            .field("films_path", &self.films_path)
            .field("accounts_path", &self.accounts_path)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("no_auth", &self.no_auth)
            .finish()
    }
}
