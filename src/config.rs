use std::net::SocketAddr;
use std::str::FromStr;

use tracing::Level;

use crate::error::Error;
use crate::ingest::DEFAULT_PAYLOAD_LIMIT;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DatabaseBackend {
    Mongo,
    Memory,
}

impl FromStr for DatabaseBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<DatabaseBackend, ()> {
        match s.to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(DatabaseBackend::Mongo),
            "memory" => Ok(DatabaseBackend::Memory),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_backend: DatabaseBackend,
    pub database_uri: String,
    pub database_name: String,
    pub seed_data: bool,
    pub optimizer_url: Option<String>,
    pub optimizer_api_key: Option<String>,
    pub log_level: Level,
    pub ingest_payload_limit: usize,
}

impl Config {
    /// Reads the configuration from the environment, after loading a `.env`
    /// file if there is one.
    pub fn from_env() -> Result<Config, Error> {
        let _ = dotenvy::dotenv();

        Config::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Ok(Config {
            bind_address: parse(&get, "BIND_ADDRESS", "127.0.0.1:8080")?,
            database_backend: parse(&get, "DATABASE_BACKEND", "mongo")?,
            database_uri: get("DATABASE_URI")
                .unwrap_or_else(|| "mongodb://localhost:27017".to_owned()),
            database_name: get("DATABASE_NAME").unwrap_or_else(|| "clientpulse".to_owned()),
            seed_data: parse(&get, "SEED_DATA", "false")?,
            optimizer_url: get("OPTIMIZER_URL"),
            optimizer_api_key: get("OPTIMIZER_API_KEY"),
            log_level: parse(&get, "LOG_LEVEL", "info")?,
            ingest_payload_limit: match get("INGEST_PAYLOAD_LIMIT") {
                Some(value) => parse_value("INGEST_PAYLOAD_LIMIT", &value)?,
                None => DEFAULT_PAYLOAD_LIMIT,
            },
        })
    }
}

fn parse<T, G>(get: &G, key: &str, default: &str) -> Result<T, Error>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    let value = get(key).unwrap_or_else(|| default.to_owned());
    parse_value(key, &value)
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, Error> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::InvalidConfiguration {
            key: key.to_owned(),
            value: value.to_owned(),
        })
}
