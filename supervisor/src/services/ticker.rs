//! Real poll-loop clock

use async_trait::async_trait;
use std::time::Duration;

use crate::traits::Ticker;

/// Sleeps for a fixed period per tick
#[derive(Debug, Clone)]
pub struct RealTicker {
    period: Duration,
}

impl RealTicker {
    /// One tick per second
    pub fn new() -> Self {
        Self {
            period: Duration::from_secs(1),
        }
    }

    pub fn with_period(period: Duration) -> Self {
        Self { period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

impl Default for RealTicker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Ticker for RealTicker {
    async fn tick(&self) {
        tokio::time::sleep(self.period).await;
    }
}
