//! Configuration management for the bookshelf server.
//!
//! This module provides a flexible configuration system that supports:
//! - Command-line arguments via clap
//! - Environment variables with `BOOKSHELF_` prefix
//! - Sensible defaults for all optional settings
//!
//! # Example
//!
//! ```ignore
//! use bookshelf::config::Config;
//!
//! // Parse from command line and environment
//! let config = Config::parse();
//!
//! // Access configuration
//! println!("Listening on {}:{}", config.host, config.port);
//! println!("Database: {}", config.mongo_db);
//! ```
//!
//! # Environment Variables
//!
//! All configuration options can be set via environment variables with the `BOOKSHELF_` prefix:
//!
//! - `BOOKSHELF_HOST` - Server bind address (default: 0.0.0.0)
//! - `BOOKSHELF_PORT` - Server port (default: 5000)
//! - `BOOKSHELF_MONGO_URL` - MongoDB connection string (required)
//! - `BOOKSHELF_MONGO_DB` - Database name (default: bookshelf)
//! - `BOOKSHELF_SESSION_SECRET` - JWT signing secret (required)
//! - `BOOKSHELF_IMAGE_UPLOAD_URL` - Image host upload endpoint (required)
//! - `BOOKSHELF_IMAGE_API_URL` - Image host management API base URL (required)
//! - `BOOKSHELF_IMAGE_PRIVATE_KEY` - Image host private API key (required)
//! - `BOOKSHELF_CORS_ORIGINS` - Allowed CORS origins (comma-separated)
//! - `BOOKSHELF_STATIC_DIR` - Prebuilt frontend directory to serve
//! - `BOOKSHELF_PRODUCTION` - Mark the session cookie `Secure` (default: false)

use std::path::PathBuf;

use clap::Parser;

use crate::server::DEFAULT_HASH_COST;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 5000;

/// Default database name.
pub const DEFAULT_DB_NAME: &str = "bookshelf";

// =============================================================================
// CLI Arguments
// =============================================================================

/// Bookshelf - A personal library catalog server.
///
/// Serves the catalog API (auth + book CRUD) backed by MongoDB, with
/// cover images stored on an external image host.
#[derive(Parser, Debug, Clone)]
#[command(name = "bookshelf")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "BOOKSHELF_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "BOOKSHELF_PORT")]
    pub port: u16,

    // =========================================================================
    // Database Configuration
    // =========================================================================
    /// MongoDB connection string.
    #[arg(long, env = "BOOKSHELF_MONGO_URL")]
    pub mongo_url: String,

    /// Database name.
    #[arg(long, default_value = DEFAULT_DB_NAME, env = "BOOKSHELF_MONGO_DB")]
    pub mongo_db: String,

    // =========================================================================
    // Session Configuration
    // =========================================================================
    /// Secret key for signing session tokens.
    #[arg(long, env = "BOOKSHELF_SESSION_SECRET")]
    pub session_secret: String,

    /// Mark the session cookie `Secure` (HTTPS-only).
    ///
    /// Enable in production behind TLS; browsers drop Secure cookies on
    /// plain HTTP.
    #[arg(long, default_value_t = false, env = "BOOKSHELF_PRODUCTION")]
    pub production: bool,

    /// bcrypt cost factor for password hashing (4-31).
    #[arg(long, default_value_t = DEFAULT_HASH_COST, env = "BOOKSHELF_HASH_COST")]
    pub hash_cost: u32,

    // =========================================================================
    // Image Host Configuration
    // =========================================================================
    /// Upload endpoint of the image host.
    #[arg(long, env = "BOOKSHELF_IMAGE_UPLOAD_URL")]
    pub image_upload_url: String,

    /// Management API base URL of the image host (used for deletes).
    #[arg(long, env = "BOOKSHELF_IMAGE_API_URL")]
    pub image_api_url: String,

    /// Private API key of the image host.
    #[arg(long, env = "BOOKSHELF_IMAGE_PRIVATE_KEY")]
    pub image_private_key: String,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin without credentials. Pin the
    /// frontend origin here so the session cookie flows cross-origin.
    #[arg(long, env = "BOOKSHELF_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Static Frontend
    // =========================================================================
    /// Directory of the prebuilt frontend to serve.
    ///
    /// Unknown paths fall back to its `index.html` so client-side
    /// routing works on reload.
    #[arg(long, env = "BOOKSHELF_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.mongo_url.is_empty() {
            return Err(
                "MongoDB connection string is required. Set --mongo-url or BOOKSHELF_MONGO_URL"
                    .to_string(),
            );
        }

        if self.mongo_db.is_empty() {
            return Err("Database name must not be empty".to_string());
        }

        if self.session_secret.is_empty() {
            return Err(
                "Session secret is required. Set --session-secret or BOOKSHELF_SESSION_SECRET"
                    .to_string(),
            );
        }

        // bcrypt rejects costs outside this range at hash time
        if self.hash_cost < 4 || self.hash_cost > 31 {
            return Err("hash_cost must be between 4 and 31".to_string());
        }

        if self.image_upload_url.is_empty() {
            return Err(
                "Image upload URL is required. Set --image-upload-url or BOOKSHELF_IMAGE_UPLOAD_URL"
                    .to_string(),
            );
        }
        if self.image_api_url.is_empty() {
            return Err(
                "Image API URL is required. Set --image-api-url or BOOKSHELF_IMAGE_API_URL"
                    .to_string(),
            );
        }
        if self.image_private_key.is_empty() {
            return Err(
                "Image private key is required. Set --image-private-key or BOOKSHELF_IMAGE_PRIVATE_KEY"
                    .to_string(),
            );
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// Tests
// =============================================================================
