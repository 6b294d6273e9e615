use async_trait::async_trait;
use std::time::Duration;

/// Simulated latency for the offline paths.
#[async_trait]
pub trait Delay: Send + Sync {
    async fn wait(&self, duration: Duration);
}

/// Waits on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Returns immediately and remembers what it was asked to wait for.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingDelay {
    waits: std::sync::Mutex<Vec<Duration>>,
}

#[cfg(test)]
impl RecordingDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn waits(&self) -> Vec<Duration> {
        self.waits
            .lock()
            .map(|waits| waits.clone())
            .unwrap_or_default()
    }

    pub fn total(&self) -> Duration {
        self.waits().into_iter().sum()
    }
}

#[cfg(test)]
#[async_trait]
impl Delay for RecordingDelay {
    async fn wait(&self, duration: Duration) {
        if let Ok(mut waits) = self.waits.lock() {
            waits.push(duration);
        }
    }
}
