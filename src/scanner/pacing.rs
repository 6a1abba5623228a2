//! Jittered delays between requests

use crate::config::PacingConfig;
use rand::Rng;
use std::time::Duration;

/// Sleeps a jittered interval between requests and between retries
#[derive(Debug, Clone)]
pub struct Pacer {
    base_delay_ms: u64,
    jitter_ms: u64,
}

impl Pacer {
    pub fn new(config: &PacingConfig) -> Self {
        Self {
            base_delay_ms: config.base_delay_ms,
            jitter_ms: config.jitter_ms,
        }
    }

    /// Picks the next delay: base plus a uniform amount in `[0, jitter)`
    pub fn next_delay(&self) -> Duration {
        let jitter = if self.jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..self.jitter_ms)
        };
        Duration::from_millis(self.base_delay_ms + jitter)
    }

    /// Sleeps for [`Pacer::next_delay`]
    ///
    /// Not interruptible: cancellation is only observed between posts.
    pub async fn pause(&self) -> Duration {
        let delay = self.next_delay();
        tracing::debug!("💤 {} ms", delay.as_millis());
        tokio::time::sleep(delay).await;
        delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_within_bounds() {
        let pacer = Pacer::new(&PacingConfig {
            base_delay_ms: 300,
            jitter_ms: 400,
        });

        for _ in 0..200 {
            let delay = pacer.next_delay();
            assert!(delay >= Duration::from_millis(300));
            assert!(delay < Duration::from_millis(700));
        }
    }

    #[test]
    fn test_zero_jitter() {
        let pacer = Pacer::new(&PacingConfig {
            base_delay_ms: 5,
            jitter_ms: 0,
        });
        assert_eq!(pacer.next_delay(), Duration::from_millis(5));
    }

    #[tokio::test]
    async fn test_pause_returns_delay() {
        let pacer = Pacer::new(&PacingConfig {
            base_delay_ms: 0,
            jitter_ms: 0,
        });
        assert_eq!(pacer.pause().await, Duration::ZERO);
    }
}
