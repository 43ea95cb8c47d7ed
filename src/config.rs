//! Runtime configuration.
//!
//! Every flag can also be set through the environment (a `.env` file is
//! loaded first by [`load_env`]).

use crate::ledger::LedgerBackendKind;
use crate::middleware::RateLimitConfig;
use crate::services::RevenueSplit;
use clap::{ArgAction, Parser};
use dotenv::dotenv;
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

#[derive(Parser, Debug, Clone)]
#[command(name = "sociora")]
#[command(about = "Sociora ledger and investment API server")]
pub struct Config {
    /// Address the HTTP server binds to
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:3000")]
    pub bind_addr: String,

    /// Ledger backend: file, memory or distributed
    #[arg(long, env = "LEDGER_BACKEND", default_value = "file")]
    pub ledger_backend: LedgerBackendKind,

    /// Ledger file (relative paths resolve against the crate directory)
    #[arg(long, env = "LEDGER_PATH", default_value = "sociora_ledger.json")]
    pub ledger_path: PathBuf,

    /// Store a SHA-256 hash with every record
    #[arg(long, env = "LEDGER_HASH_RECORDS", default_value_t = true, action = ArgAction::Set)]
    pub ledger_hash_records: bool,

    /// SQLite database holding user accounts
    #[arg(long, env = "AUTH_DB_PATH", default_value = "sociora_auth.db")]
    pub auth_db_path: PathBuf,

    /// HMAC secret for JWTs; when unset a random per-process secret is used and
    /// tokens stop validating after a restart
    #[arg(long, env = "JWT_SECRET")]
    pub jwt_secret: Option<String>,

    /// Token lifetime in hours
    #[arg(long, env = "JWT_EXPIRATION_HOURS", default_value = "24")]
    pub jwt_expiration_hours: i64,

    /// Password for the seeded admin account (first start only)
    #[arg(long, env = "ADMIN_PASSWORD")]
    pub admin_password: Option<String>,

    /// Requests allowed per client per window
    #[arg(long, env = "RATE_LIMIT_MAX_REQUESTS", default_value = "100")]
    pub rate_limit_max_requests: u32,

    /// Rate limit window in seconds
    #[arg(long, env = "RATE_LIMIT_WINDOW_SECS", default_value = "60")]
    pub rate_limit_window_secs: u64,

    /// Extra requests tolerated above the limit
    #[arg(long, env = "RATE_LIMIT_BURST", default_value = "20")]
    pub rate_limit_burst: u32,

    /// Creator share of distributed revenue, in percent
    #[arg(long, env = "REVENUE_SPLIT_CREATOR", default_value = "70")]
    pub revenue_split_creator: f64,

    /// Investor pool share, in percent
    #[arg(long, env = "REVENUE_SPLIT_INVESTORS", default_value = "20")]
    pub revenue_split_investors: f64,

    /// Platform fee share, in percent
    #[arg(long, env = "REVENUE_SPLIT_PLATFORM", default_value = "10")]
    pub revenue_split_platform: f64,

    /// Account credited with platform fees
    #[arg(long, env = "PLATFORM_ACCOUNT", default_value = "sociora-platform")]
    pub platform_account: String,
}

impl Config {
    pub fn ledger_path(&self) -> PathBuf {
        resolve_data_path(&self.ledger_path)
    }

    pub fn auth_db_path(&self) -> PathBuf {
        resolve_data_path(&self.auth_db_path)
    }

    pub fn rate_limit(&self) -> RateLimitConfig {
        RateLimitConfig {
            max_requests: self.rate_limit_max_requests,
            window: Duration::from_secs(self.rate_limit_window_secs.max(1)),
            burst: self.rate_limit_burst,
        }
    }

    pub fn revenue_split(&self) -> RevenueSplit {
        RevenueSplit {
            creator: self.revenue_split_creator,
            investors: self.revenue_split_investors,
            platform: self.revenue_split_platform,
        }
    }
}

/// Treat relative paths as relative to the crate directory, not the caller's cwd.
pub fn resolve_data_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    Path::new(env!("CARGO_MANIFEST_DIR")).join(path)
}

/// 64 hex chars from two v4 UUIDs (244 random bits).
pub fn generate_secret() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

pub fn load_env() {
    // 1) Standard dotenv search (cwd + parents)
    let _ = dotenv();

    // 2) Also try the crate's own .env when launched from elsewhere
    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_parse() {
        let config = Config::try_parse_from([
            "sociora",
            "--ledger-backend",
            "memory",
            "--ledger-path",
            "/var/lib/sociora/ledger.json",
            "--ledger-hash-records",
            "false",
            "--revenue-split-creator",
            "60",
            "--revenue-split-investors",
            "30",
            "--rate-limit-window-secs",
            "0",
        ])
        .unwrap();

        assert_eq!(config.ledger_backend, LedgerBackendKind::Memory);
        assert_eq!(
            config.ledger_path(),
            PathBuf::from("/var/lib/sociora/ledger.json")
        );
        assert!(!config.ledger_hash_records);

        let split = config.revenue_split();
        assert_eq!(split.creator, 60.0);
        assert_eq!(split.investors, 30.0);
        assert!(split.validate().is_ok());

        // A zero window would make every request its own window
        assert_eq!(config.rate_limit().window, Duration::from_secs(1));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let result = Config::try_parse_from(["sociora", "--ledger-backend", "postgres"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_generated_secrets_are_long_and_distinct() {
        let first = generate_secret();
        let second = generate_secret();
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(first, second);
    }

    #[test]
    fn test_relative_paths_anchor_to_crate_dir() {
        let resolved = resolve_data_path(Path::new("data/ledger.json"));
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("data/ledger.json"));
        assert!(resolved.starts_with(env!("CARGO_MANIFEST_DIR")));
    }
}
