//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! rb-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `RECIPE_BOX_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Schema migrations live in `crates/web/migrations/`; the session table is
//! created by tower-sessions-sqlx-store.

use secrecy::SecretString;
use tracing::info;

use recipe_box_web::db;

/// Read the database URL the same way the web binary does.
///
/// # Errors
///
/// Returns a message naming the variable if neither is set.
pub fn database_url() -> Result<SecretString, &'static str> {
    dotenvy::dotenv().ok();

    std::env::var("RECIPE_BOX_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "RECIPE_BOX_DATABASE_URL not set")
}

/// Run all database migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails, or
/// a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let database_url = database_url()?;

    info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    info!("Running migrations...");
    db::run_migrations(&pool).await?;

    info!("Migrations complete!");
    Ok(())
}
