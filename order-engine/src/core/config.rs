/// Service configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | DATABASE_PATH | order-engine.db | SQLite file |
/// | HTTP_PORT | 8080 | HTTP listen port |
/// | ENVIRONMENT | development | development / staging / production |
/// | LOG_LEVEL | info | default log filter |
/// | LOG_JSON | true in production | JSON console logs |
/// | LOG_DIR | (unset) | daily rolling log files |
/// | DB_MAX_CONNECTIONS | 5 | pool size |
///
/// # Example
///
/// ```ignore
/// DATABASE_PATH=/data/orders.db HTTP_PORT=9000 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub http_port: u16,
    /// Runtime environment: development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
    pub db_max_connections: u32,
}

impl Config {
    /// Load from environment variables; unset or unparsable values fall
    /// back to their defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let environment = get("ENVIRONMENT").unwrap_or_else(|| "development".into());
        let is_production = environment == "production";

        Self {
            database_path: get("DATABASE_PATH").unwrap_or_else(|| "order-engine.db".into()),
            http_port: get("HTTP_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_json: get("LOG_JSON")
                .and_then(|v| v.parse().ok())
                .unwrap_or(is_production),
            log_dir: get("LOG_DIR").filter(|s| !s.is_empty()),
            db_max_connections: get("DB_MAX_CONNECTIONS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            environment,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
