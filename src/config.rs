use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// PostgreSQL connection URL; the in-memory store is used when unset
    #[serde(default)]
    pub database_url: Option<String>,

    /// Secret used to sign and verify bearer tokens
    pub jwt_secret: String,

    /// Email of the reference user whose taste backs the judgement verdicts
    #[serde(default = "default_reference_email")]
    pub reference_email: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_reference_email() -> String {
    "the-eye@example.com".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}
