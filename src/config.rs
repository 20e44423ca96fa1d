use anyhow::{Context, Result};
use clap::Parser;
use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;

/// Serving Gateway - chat proxy for an LLM serving endpoint
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Server host address
    #[arg(short = 'H', long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Server port
    #[arg(short, long, env = "SERVER_PORT", default_value = "8000")]
    pub port: u16,

    /// URL of the model serving endpoint that chat requests are forwarded to
    #[arg(short = 'e', long, env = "SERVING_ENDPOINT_NAME")]
    pub serving_endpoint: Option<String>,

    /// Bearer token sent to the serving endpoint
    #[arg(short = 'k', long, env = "API_KEY")]
    pub api_key: Option<String>,

    /// Upstream request timeout in seconds
    #[arg(long, env = "UPSTREAM_TIMEOUT", default_value = "500")]
    pub upstream_timeout: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Allowed CORS origins (comma-separated)
    #[arg(
        long,
        env = "CORS_ORIGINS",
        default_value = "http://localhost:3000",
        value_delimiter = ','
    )]
    pub cors_origins: Vec<String>,

    /// Directory holding the prebuilt web client
    #[arg(long, env = "STATIC_DIR", default_value = "client/build")]
    pub static_dir: String,

    /// Base URL that load-test users send traffic to (defaults to this server)
    #[arg(long, env = "LOAD_TEST_TARGET")]
    pub load_test_target: Option<String>,

    /// Minimum think time between load-test requests in milliseconds
    #[arg(long, env = "LOAD_TEST_WAIT_MIN_MS", default_value = "1000")]
    pub load_test_wait_min_ms: u64,

    /// Maximum think time between load-test requests in milliseconds
    #[arg(long, env = "LOAD_TEST_WAIT_MAX_MS", default_value = "2000")]
    pub load_test_wait_max_ms: u64,

    /// Longest load test accepted over HTTP, in seconds
    #[arg(long, env = "LOAD_TEST_MAX_DURATION", default_value = "600")]
    pub load_test_max_duration: u64,
}

#[derive(Clone, Debug)]
pub struct Config {
    // Server settings
    pub server_host: String,
    pub server_port: u16,

    // Upstream serving endpoint
    pub serving_endpoint: Url,
    pub api_key: String,
    pub upstream_timeout: u64,

    // Logging
    pub log_level: String,

    // Web client
    pub cors_origins: Vec<String>,
    pub static_dir: PathBuf,

    // Load testing
    pub load_test: LoadTestSettings,
}

/// Defaults for load tests started through the HTTP API
#[derive(Clone, Debug, PartialEq)]
pub struct LoadTestSettings {
    pub target_url: String,
    pub wait_min: Duration,
    pub wait_max: Duration,
    pub max_duration: u64,
}

impl Config {
    /// Load configuration from all sources with priority: CLI > ENV > defaults
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let args = CliArgs::parse();
        Self::from_args(args)
    }

    /// Build configuration from parsed arguments
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let endpoint = args
            .serving_endpoint
            .filter(|s| !s.trim().is_empty())
            .context("SERVING_ENDPOINT_NAME is required (use -e or set SERVING_ENDPOINT_NAME env var)")?;

        let serving_endpoint = Url::parse(endpoint.trim())
            .with_context(|| format!("SERVING_ENDPOINT_NAME is not a valid URL: {}", endpoint))?;

        let api_key = args
            .api_key
            .filter(|s| !s.is_empty())
            .context("API_KEY is required (use -k or set API_KEY env var)")?;

        let target_url = args
            .load_test_target
            .unwrap_or_else(|| format!("http://127.0.0.1:{}", args.port));

        let config = Config {
            server_host: args.host,
            server_port: args.port,
            serving_endpoint,
            api_key,
            upstream_timeout: args.upstream_timeout,
            log_level: args.log_level,
            cors_origins: parse_origins(&args.cors_origins),
            static_dir: PathBuf::from(args.static_dir),
            load_test: LoadTestSettings {
                target_url: target_url.trim_end_matches('/').to_string(),
                wait_min: Duration::from_millis(args.load_test_wait_min_ms),
                wait_max: Duration::from_millis(args.load_test_wait_max_ms),
                max_duration: args.load_test_max_duration,
            },
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.upstream_timeout == 0 {
            anyhow::bail!("UPSTREAM_TIMEOUT must be greater than 0");
        }

        if self.load_test.wait_min > self.load_test.wait_max {
            anyhow::bail!(
                "LOAD_TEST_WAIT_MIN_MS ({}) is greater than LOAD_TEST_WAIT_MAX_MS ({})",
                self.load_test.wait_min.as_millis(),
                self.load_test.wait_max.as_millis()
            );
        }

        Url::parse(&self.load_test.target_url).with_context(|| {
            format!(
                "LOAD_TEST_TARGET is not a valid URL: {}",
                self.load_test.target_url
            )
        })?;

        Ok(())
    }
}

/// Trim origins and drop empty entries
fn parse_origins(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
