//! Summary of a load test run.

use serde::{Deserialize, Serialize};

/// Response times in milliseconds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseTimeStats {
    pub min: f64,
    pub max: f64,
    pub average: f64,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
}

/// Aggregated outcome of a load test run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadTestResult {
    /// Wall-clock seconds from the first spawn until every user stopped
    pub test_duration: f64,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub requests_per_second: f64,
    pub response_time: ResponseTimeStats,
    /// Distinct error messages in first-seen order
    pub errors: Vec<String>,
    /// Simulated users actually started before the deadline
    pub users_spawned: u32,
}

impl LoadTestResult {
    /// Share of successful requests as a percentage (100 for an empty run)
    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            return 100.0;
        }
        self.successful_requests as f64 / self.total_requests as f64 * 100.0
    }

    /// Print the summary as an ASCII table
    pub fn print_table(&self) {
        println!();
        println!("╔══════════════════════════════════════════════════════╗");
        println!("║                 LOAD TEST RESULTS                    ║");
        println!("╚══════════════════════════════════════════════════════╝");
        println!();
        println!("┌──────────────────────────┬───────────────────────────┐");
        println!("│ Duration                 │ {:>23.2} s │", self.test_duration);
        println!("│ Users spawned            │ {:>25} │", self.users_spawned);
        println!("│ Total requests           │ {:>25} │", self.total_requests);
        println!("│ Successful               │ {:>25} │", self.successful_requests);
        println!("│ Failed                   │ {:>25} │", self.failed_requests);
        println!("│ Success rate             │ {:>24.1}% │", self.success_rate());
        println!("│ Requests/sec             │ {:>25.2} │", self.requests_per_second);
        println!("├──────────────────────────┼───────────────────────────┤");
        println!("│ Response min             │ {:>22.1} ms │", self.response_time.min);
        println!("│ Response avg             │ {:>22.1} ms │", self.response_time.average);
        println!("│ Response max             │ {:>22.1} ms │", self.response_time.max);
        println!("│ Response p50             │ {:>22.1} ms │", self.response_time.p50);
        println!("│ Response p95             │ {:>22.1} ms │", self.response_time.p95);
        println!("│ Response p99             │ {:>22.1} ms │", self.response_time.p99);
        println!("└──────────────────────────┴───────────────────────────┘");

        if !self.errors.is_empty() {
            println!();
            println!("Errors:");
            for error in &self.errors {
                println!("  - {}", error);
            }
        }
        println!();
    }

    /// Serialize the summary as pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
