//! Reconnection bookkeeping used by the connection manager.

use std::time::Duration;

use super::config::RetryPolicy;

/// Counts consecutive failures and decides whether another attempt is due.
#[derive(Debug)]
pub struct RetryState {
    policy: RetryPolicy,
    attempts: u32,
}

impl RetryState {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            attempts: 0,
        }
    }

    /// Forget previous failures after a successful connect.
    pub fn record_success(&mut self) {
        self.attempts = 0;
    }

    /// Delay before the next attempt, or `None` once the attempt budget is
    /// spent.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if let Some(max) = self.policy.max_attempts
            && self.attempts >= max
        {
            return None;
        }
        self.attempts = self.attempts.saturating_add(1);
        Some(self.policy.interval)
    }

    /// Reconnect attempts scheduled since the last successful connect.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}
