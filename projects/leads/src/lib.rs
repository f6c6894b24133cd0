//! Instagram leads bridge service
//!
//! - REST API and Phantom Buster webhook endpoints in `endpoints/`
//! - PostgreSQL models and queries in `db/`
//! - Webhook payload and CSV lead parsing in `utils/`
//! - Configured from the environment (see `config`), `DATABASE_URL` required

pub mod config;
pub mod endpoints;
pub mod db;
pub mod utils;
