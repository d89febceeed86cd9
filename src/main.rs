use std::sync::Arc;

use tracing::{error, info};

use lms::config::Config;
use lms::mail::{build_transport, Mailer};
use lms::web::{AppState, WebServer};
use lms::{Database, TokenEngine};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = lms::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        lms::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = run(config).await {
        error!("LMS terminated: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> lms::Result<()> {
    config.validate()?;

    info!("LMS - Loan Management System");

    let db = Database::open(&config.database.path).await?;
    let tokens = Arc::new(TokenEngine::new(&config.auth.jwt_secret));
    let transport = build_transport(&config.mail)?;
    info!("Account emails go to {}", transport.describe());
    let mailer = Mailer::new(transport, config.mail.base_url.clone());
    let state = AppState::new(&db, tokens, mailer, &config.auth);

    if let (Some(email), Some(password)) = (&config.admin.email, &config.admin.password) {
        state.accounts.bootstrap_admin(email, password).await?;
    }

    let server = WebServer::new(&config, state)?;
    info!(
        "Server configured on {}:{}",
        config.server.host, config.server.port
    );
    server.run().await
}
