//! Load test CLI
//!
//! Usage:
//!   load-test --url http://localhost:8000 -u 10 -r 2 -t 30
//!   load-test --url http://localhost:8000 -u 50 -r 5 -t 60 --path /api/health --json

use clap::Parser;
use std::time::Duration;

use serving_gateway::load_test::{LoadTarget, LoadTestConfig, LoadTestRunner, WaitTime};

#[derive(Parser, Debug)]
#[command(name = "load-test")]
#[command(about = "Simulate concurrent users against a Serving Gateway")]
struct Cli {
    /// Gateway base URL
    #[arg(short = 'g', long, default_value = "http://localhost:8000")]
    url: String,

    /// Path requested by every simulated user
    #[arg(long, default_value = "/api/")]
    path: String,

    /// Number of simulated users
    #[arg(short = 'u', long, default_value = "10", allow_negative_numbers = true)]
    users: i64,

    /// Users started per second
    #[arg(short = 'r', long, default_value = "2", allow_negative_numbers = true)]
    spawn_rate: i64,

    /// Test duration in seconds
    #[arg(short = 't', long, default_value = "30", allow_negative_numbers = true)]
    test_time: i64,

    /// Minimum think time between requests in milliseconds
    #[arg(long, default_value = "1000")]
    wait_min_ms: u64,

    /// Maximum think time between requests in milliseconds
    #[arg(long, default_value = "2000")]
    wait_max_ms: u64,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "60")]
    timeout: u64,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.log_level.to_lowercase()));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let config = LoadTestConfig::new(cli.users, cli.spawn_rate, cli.test_time)?;

    let target = LoadTarget::new(cli.url)
        .with_path(cli.path)
        .with_wait(WaitTime::between(
            Duration::from_millis(cli.wait_min_ms),
            Duration::from_millis(cli.wait_max_ms),
        ))
        .with_request_timeout(Duration::from_secs(cli.timeout));

    if !cli.json {
        println!("Starting load test against {}", target.url());
        println!(
            "Users: {}, spawn rate: {}/s, duration: {}s",
            config.users(),
            config.spawn_rate(),
            config.test_time()
        );
    }

    let runner = LoadTestRunner::new(config, target)?;
    let result = runner.run().await?;

    if cli.json {
        println!("{}", result.to_json()?);
    } else {
        result.print_table();
    }

    Ok(())
}
