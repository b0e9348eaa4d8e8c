//! API configuration
//!
//! Read from `API_`-prefixed environment variables, falling back to the
//! defaults below for anything unset.

use std::path::Path;

use serde::Deserialize;

use core_kernel::{AccountId, CoreError};
use domain_ledger::Account;

/// Which `LedgerStore` adapter backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Postgres,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Plain,
    Json,
}

/// API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Log filter directive, overridden by `RUST_LOG`
    pub log_level: String,
    pub log_format: LogFormat,
    /// Store adapter to run against
    pub store: StoreBackend,
    /// Database URL, used by the `postgres` backend
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    /// Whether transfers append journal entries
    pub journal_enabled: bool,
    /// JSON file of `{id, balance}` objects seeding the `memory` backend
    pub seed_file: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            log_format: LogFormat::Plain,
            store: StoreBackend::Memory,
            database_url: "postgres://localhost/ledger".to_string(),
            db_max_connections: 10,
            db_min_connections: 1,
            journal_enabled: true,
            seed_file: None,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        config::Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("log_level", defaults.log_level)?
            .set_default("log_format", "plain")?
            .set_default("store", "memory")?
            .set_default("database_url", defaults.database_url)?
            .set_default("db_max_connections", i64::from(defaults.db_max_connections))?
            .set_default("db_min_connections", i64::from(defaults.db_min_connections))?
            .set_default("journal_enabled", defaults.journal_enabled)?
            .add_source(config::Environment::with_prefix("API").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Accounts the in-memory store starts with
    ///
    /// Reads `seed_file` when set, otherwise returns account 0 with 100 and
    /// account 1 with 50.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Configuration` if the file cannot be read or parsed,
    /// or `CoreError::Validation` if it holds a negative balance.
    pub fn seed_accounts(&self) -> Result<Vec<Account>, CoreError> {
        match &self.seed_file {
            Some(path) => load_seed_file(Path::new(path)),
            None => Ok(default_seed()),
        }
    }
}

pub fn default_seed() -> Vec<Account> {
    vec![
        Account::new(AccountId::new(0), 100),
        Account::new(AccountId::new(1), 50),
    ]
}

/// Parses a JSON seed file, rejecting negative balances
pub fn load_seed_file(path: &Path) -> Result<Vec<Account>, CoreError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        CoreError::configuration(format!("cannot read seed file {}: {}", path.display(), e))
    })?;
    parse_seed(&raw)
}

fn parse_seed(raw: &str) -> Result<Vec<Account>, CoreError> {
    let accounts: Vec<Account> = serde_json::from_str(raw)
        .map_err(|e| CoreError::configuration(format!("invalid seed file: {}", e)))?;
    accounts
        .into_iter()
        .map(|account| Account::open(account.id, account.balance))
        .collect()
}
