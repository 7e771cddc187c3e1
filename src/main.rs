//! Bookshelf - A personal library catalog server.
//!
//! This binary starts the HTTP server and configures all components.

use std::process::ExitCode;

use clap::Parser;
use mongodb::bson::doc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookshelf::{
    catalog::MongoCatalog,
    config::Config,
    image::HostedImageStore,
    server::{create_router, AppState, RouterConfig, SessionAuth},
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    // Initialize logging
    init_logging(config.verbose);

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Configuration:");
    info!("  Database: {}", config.mongo_db);
    info!("  Image host: {}", config.image_api_url);
    if config.production {
        info!("  Cookies: Secure (production)");
    } else {
        warn!("  Cookies: not Secure - enable --production behind TLS");
    }
    if let Some(ref dir) = config.static_dir {
        info!("  Static frontend: {}", dir.display());
    }

    // Connect to MongoDB and verify reachability before serving
    info!("Connecting to MongoDB...");
    let client = match mongodb::Client::with_uri_str(&config.mongo_url).await {
        Ok(client) => client,
        Err(e) => {
            error!("Invalid MongoDB connection string: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let db = client.database(&config.mongo_db);
    if let Err(e) = db.run_command(doc! { "ping": 1 }, None).await {
        error!("Failed to reach MongoDB: {}", e);
        error!("");
        error!("Please check:");
        error!("  - The server at the configured connection string is running");
        error!("  - Credentials in the connection string are correct");
        return ExitCode::FAILURE;
    }
    info!("  Connected successfully");

    // Assemble components
    let store = MongoCatalog::new(&db);
    let images = HostedImageStore::new(
        &config.image_upload_url,
        &config.image_api_url,
        &config.image_private_key,
    );
    let sessions = SessionAuth::new(&config.session_secret);

    let state = AppState::new(store, images, sessions)
        .with_secure_cookies(config.production)
        .with_hash_cost(config.hash_cost);

    let router = create_router(state, build_router_config(&config));

    // Bind and serve
    let addr = config.bind_address();

    info!("");
    info!("Server listening on: http://{}", addr);
    info!("  Try: curl http://{}/api/fetch-books", addr);
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "bookshelf=debug,tower_http=debug"
    } else {
        "bookshelf=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application Config.
fn build_router_config(config: &Config) -> RouterConfig {
    let mut router_config = RouterConfig::new().with_tracing(!config.no_tracing);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    if let Some(ref dir) = config.static_dir {
        router_config = router_config.with_static_dir(dir.clone());
    }

    router_config
}
