// src/config.rs

use dotenvy::dotenv;
use std::env;

/// Every question carries exactly this many options.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// Length of a generated test code (uppercase hex characters).
pub const TEST_CODE_LENGTH: usize = 8;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://tvet.db?mode=rwc".to_string());

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            database_url,
            rust_log,
        }
    }
}
