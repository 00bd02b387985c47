use clap::Parser;
use dotenvy::dotenv;

/// Startup configuration, parsed once and read-only afterwards.
#[derive(Parser, Debug, Clone)]
#[command(name = "lensgate", about = "HTTP proxy in front of the ProductAI visual search API")]
pub struct Config {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8080", env = "LENSGATE_LISTEN")]
    pub listen: String,

    /// ProductAI service id (last path segment of the search endpoint)
    #[arg(long, env = "LENSGATE_SERVICE_ID")]
    pub service_id: String,

    /// ProductAI access key, sent as X-CA-AccessKeyId
    #[arg(long, env = "LENSGATE_ACCESS_KEY_ID")]
    pub access_key_id: String,

    /// Prefix prepended to upstream metadata paths to build html_url
    #[arg(long, env = "LENSGATE_URL_PREFIX")]
    pub url_prefix: String,
}

impl Config {
    pub fn from_args() -> Config {
        dotenv().ok(); // Load .env file if present
        Config::parse()
    }
}
