use serde::Deserialize;
use std::env;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub graph: GraphConfig,
    pub ledger: LedgerConfig,
    pub search: SearchConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    pub path: String,
    pub namespace: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// SQLite database file, or `:memory:`
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub default_limit: usize,
    /// Optional cap on connections per enumerated path; unset searches
    /// every simple path
    pub max_hops: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "pretty"
}

impl Default for Config {
    fn default() -> Self {
        Self {
            graph: GraphConfig {
                path: "./data/rail-graph".to_string(),
                namespace: "rail".to_string(),
            },
            ledger: LedgerConfig {
                path: "./data/rail-ledger.sqlite".to_string(),
            },
            search: SearchConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 5,
            max_hops: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let defaults = Self::default();

        let config = Self {
            graph: GraphConfig {
                path: env::var("GRAPH_PATH").unwrap_or(defaults.graph.path),
                namespace: env::var("GRAPH_NAMESPACE").unwrap_or(defaults.graph.namespace),
            },
            ledger: LedgerConfig {
                path: env::var("LEDGER_PATH").unwrap_or(defaults.ledger.path),
            },
            search: SearchConfig {
                default_limit: env::var("SEARCH_DEFAULT_LIMIT")
                    .unwrap_or_else(|_| defaults.search.default_limit.to_string())
                    .parse()?,
                max_hops: env::var("SEARCH_MAX_HOPS")
                    .ok()
                    .map(|v| v.parse())
                    .transpose()?,
            },
            logging: LoggingConfig {
                level: env::var("LOG_LEVEL").unwrap_or(defaults.logging.level),
                format: env::var("LOG_FORMAT").unwrap_or(defaults.logging.format),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file (any format the `config` crate
    /// understands), with `RAIL_`-prefixed environment overrides such as
    /// `RAIL_SEARCH__MAX_HOPS=8`
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let settings = config::Config::builder()
            .set_default("graph.path", defaults.graph.path)?
            .set_default("graph.namespace", defaults.graph.namespace)?
            .set_default("ledger.path", defaults.ledger.path)?
            .set_default("search.default_limit", defaults.search.default_limit as u64)?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.format", defaults.logging.format)?
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("RAIL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.search.max_hops == Some(0) {
            anyhow::bail!("search.max_hops must be at least 1");
        }
        if self.search.default_limit == 0 {
            anyhow::bail!("search.default_limit must be at least 1");
        }
        Ok(())
    }
}
