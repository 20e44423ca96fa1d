//! Load test runner: ramps simulated users up and collects their results.

use anyhow::Context;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio::time::Instant;

use super::config::{LoadTarget, LoadTestConfig};
use super::metrics::LoadMetrics;
use super::report::LoadTestResult;
use super::user::SimulatedUser;

/// Runs one load test against a target
pub struct LoadTestRunner {
    config: LoadTestConfig,
    target: LoadTarget,
    client: reqwest::Client,
}

impl LoadTestRunner {
    pub fn new(config: LoadTestConfig, target: LoadTarget) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(target.request_timeout)
            .pool_max_idle_per_host(config.users() as usize)
            .build()
            .context("Failed to create load test HTTP client")?;

        Ok(Self {
            config,
            target,
            client,
        })
    }

    /// Run the test to completion.
    ///
    /// Users are spawned evenly at `spawn_rate` per second until all are up
    /// or the deadline passes. After the deadline no user starts a new
    /// request; in-flight requests finish (or time out) before the summary
    /// is computed. Dropping the returned future aborts every user.
    pub async fn run(&self) -> anyhow::Result<LoadTestResult> {
        let metrics = Arc::new(LoadMetrics::new()?);
        let spawn_interval = self.config.spawn_interval();

        tracing::info!(
            users = self.config.users(),
            spawn_rate = self.config.spawn_rate(),
            test_time = self.config.test_time(),
            url = %self.target.url(),
            "Starting load test"
        );

        let start = Instant::now();
        let deadline = start
            .checked_add(self.config.duration())
            .context("Load test duration is too long")?;
        metrics.start();

        let mut users = JoinSet::new();
        for id in 0..self.config.users() {
            if Instant::now() >= deadline {
                tracing::debug!(spawned = id, "Deadline reached during ramp-up");
                break;
            }

            let user = SimulatedUser::new(id, self.client.clone(), &self.target);
            users.spawn(user.run(deadline, metrics.clone()));

            if id + 1 < self.config.users() {
                let next_spawn = (start + spawn_interval * (id + 1)).min(deadline);
                tokio::time::sleep_until(next_spawn).await;
            }
        }

        let users_spawned = users.len() as u32;

        // Wait for all users (and their in-flight requests) to finish
        while let Some(joined) = users.join_next().await {
            if let Err(e) = joined {
                tracing::warn!(error = %e, "Simulated user task failed");
            }
        }

        metrics.stop();

        let result = LoadTestResult {
            users_spawned,
            ..metrics.summary()
        };

        tracing::info!(
            total_requests = result.total_requests,
            failed_requests = result.failed_requests,
            requests_per_second = %format!("{:.2}", result.requests_per_second),
            duration_secs = %format!("{:.2}", result.test_duration),
            "Load test finished"
        );

        Ok(result)
    }
}
