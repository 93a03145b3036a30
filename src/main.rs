use clap::Parser;
use daily_tasks::cli::{Args, build_config, init_logging, load_jwt_secrets, open_database};
use daily_tasks::run_server;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // A missing .env file is fine, real environment variables still apply.
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_format);

    let Some((access_secret, refresh_secret)) = load_jwt_secrets(&args) else {
        std::process::exit(1);
    };

    let Some(db) = open_database(&args.database).await else {
        std::process::exit(1);
    };

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            error!(address = %addr, error = %e, "Failed to bind");
            std::process::exit(1);
        });

    let local_addr = match listener.local_addr() {
        Ok(local_addr) => local_addr,
        Err(e) => {
            error!(error = %e, "Failed to read local address");
            std::process::exit(1);
        }
    };

    let config = build_config(db, access_secret, refresh_secret);

    info!(address = %local_addr, "Listening");

    if let Err(e) = run_server(config, listener).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
