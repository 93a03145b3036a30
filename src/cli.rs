//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use crate::db::Database;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Environment variable holding the access token secret.
pub const ACCESS_SECRET_ENV: &str = "JWT_ACCESS_SECRET";

/// Environment variable holding the refresh token secret.
pub const REFRESH_SECRET_ENV: &str = "JWT_REFRESH_SECRET";

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "daily-tasks", about = "Task management REST API")]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, env = "REST_API_PORT", default_value = "8080")]
    pub port: u16,

    /// Path to SQLite database file
    #[arg(short, long, env = "DATABASE_PATH", default_value = "daily-tasks.db")]
    pub database: String,

    /// Path to file containing the access token secret. Prefer JWT_ACCESS_SECRET instead
    #[arg(long)]
    pub jwt_access_secret_file: Option<String>,

    /// Path to file containing the refresh token secret. Prefer JWT_REFRESH_SECRET instead
    #[arg(long)]
    pub jwt_refresh_secret_file: Option<String>,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format. `RUST_LOG` overrides the default level.
pub fn init_logging(format: &LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("{}=info,axum::rejection=trace", env!("CARGO_CRATE_NAME")).into()
    });

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
        LogFormat::Compact => builder.compact().init(),
    }
}

/// Load a JWT secret from an environment variable or a file.
/// Returns None and logs an error if the secret cannot be loaded.
pub fn load_secret(env_var: &str, secret_file: Option<&str>) -> Option<String> {
    let secret = if let Ok(secret) = std::env::var(env_var) {
        // Clear the environment variable to prevent leaking
        // SAFETY: We're single-threaded at this point during startup,
        // and no other code is reading this environment variable.
        unsafe { std::env::remove_var(env_var) };
        secret
    } else if let Some(path) = secret_file {
        match std::fs::read_to_string(path) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read JWT secret file");
                return None;
            }
        }
    } else {
        error!(
            variable = env_var,
            "JWT secret is required. Set the environment variable (recommended) or use the matching --*-secret-file flag"
        );
        return None;
    };

    if secret.len() < MIN_JWT_SECRET_LENGTH {
        error!(
            variable = env_var,
            "JWT secret is shorter than {} characters. Use a longer secret", MIN_JWT_SECRET_LENGTH
        );
        return None;
    }

    Some(secret)
}

/// Load both token secrets. Returns None if either is missing or too short.
pub fn load_jwt_secrets(args: &Args) -> Option<(String, String)> {
    let access = load_secret(ACCESS_SECRET_ENV, args.jwt_access_secret_file.as_deref())?;
    let refresh = load_secret(REFRESH_SECRET_ENV, args.jwt_refresh_secret_file.as_deref())?;

    if access == refresh {
        warn!("Access and refresh token secrets are identical. Use distinct secrets");
    }

    Some((access, refresh))
}

/// Open the database and run migrations.
/// Returns None and logs an error if the database cannot be opened.
pub async fn open_database(path: &str) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => {
            info!(path = %path, "Opened database");
            Some(db)
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}

/// Build the server configuration from parsed arguments.
pub fn build_config(db: Database, access_secret: String, refresh_secret: String) -> ServerConfig {
    ServerConfig {
        db,
        jwt_access_secret: access_secret.into_bytes(),
        jwt_refresh_secret: refresh_secret.into_bytes(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["daily-tasks"]).unwrap();
        assert!(args.port > 0);
        assert!(args.jwt_access_secret_file.is_none());
        assert!(matches!(args.log_format, LogFormat::Pretty));
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "daily-tasks",
            "--port",
            "9000",
            "--database",
            ":memory:",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(args.port, 9000);
        assert_eq!(args.database, ":memory:");
        assert!(matches!(args.log_format, LogFormat::Json));
    }

    #[test]
    fn test_load_secret_from_file() {
        let path = std::env::temp_dir().join(format!("daily-tasks-secret-{}", std::process::id()));
        std::fs::write(&path, "  0123456789abcdef0123456789abcdef\n").unwrap();

        let secret = load_secret("DAILY_TASKS_TEST_UNSET_SECRET", path.to_str());
        assert_eq!(secret.as_deref(), Some("0123456789abcdef0123456789abcdef"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_secret_rejects_short_secret() {
        let path =
            std::env::temp_dir().join(format!("daily-tasks-short-secret-{}", std::process::id()));
        std::fs::write(&path, "short").unwrap();

        assert!(load_secret("DAILY_TASKS_TEST_UNSET_SECRET", path.to_str()).is_none());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_secret_missing() {
        assert!(load_secret("DAILY_TASKS_TEST_UNSET_SECRET", None).is_none());
    }
}
