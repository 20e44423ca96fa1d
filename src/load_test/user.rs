//! Simulated user: issue a request, think, repeat until the run ends.

use std::sync::Arc;
use tokio::time::Instant;

use super::config::{LoadTarget, WaitTime};
use super::metrics::LoadMetrics;

pub struct SimulatedUser {
    id: u32,
    client: reqwest::Client,
    url: String,
    wait: WaitTime,
}

impl SimulatedUser {
    pub fn new(id: u32, client: reqwest::Client, target: &LoadTarget) -> Self {
        Self {
            id,
            client,
            url: target.url(),
            wait: target.wait,
        }
    }

    /// Issue one GET request and record its outcome
    pub async fn execute_once(&self, metrics: &LoadMetrics) {
        let start = Instant::now();

        match self.client.get(&self.url).send().await {
            Ok(response) => {
                let status = response.status();
                // Drain the body so the connection goes back to the pool
                let body = response.bytes().await;
                let latency = start.elapsed();

                match body {
                    Ok(_) if status.is_success() => metrics.record_success(latency),
                    Ok(_) => {
                        tracing::debug!(user = self.id, status = %status, "Request failed");
                        metrics.record_failure(latency, format!("HTTP {}", status));
                    }
                    Err(e) => {
                        tracing::debug!(user = self.id, error = %e, "Failed to read response body");
                        metrics.record_failure(latency, e.to_string());
                    }
                }
            }
            Err(e) => {
                tracing::debug!(user = self.id, error = %e, "Request error");
                metrics.record_failure(start.elapsed(), e.to_string());
            }
        }
    }

    /// Loop until `deadline`, returning the number of requests issued.
    ///
    /// A request started before the deadline is always allowed to finish.
    pub async fn run(self, deadline: Instant, metrics: Arc<LoadMetrics>) -> u64 {
        let mut issued = 0;

        while Instant::now() < deadline {
            self.execute_once(&metrics).await;
            issued += 1;

            let wake = (Instant::now() + self.wait.sample()).min(deadline);
            tokio::time::sleep_until(wake).await;
        }

        tracing::debug!(user = self.id, requests = issued, "Simulated user stopped");
        issued
    }
}
