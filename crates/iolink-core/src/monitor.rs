//! Continuous temperature monitoring with running statistics

use chrono::{DateTime, Local};
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use crate::error::ClientError;
use crate::master::IoLinkMaster;
use crate::transport::Transport;

/// Polling schedule for [`IoLinkMaster::monitor_temperature`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorOptions {
    /// Pause between readings
    pub interval: Duration,
    /// Stop after this long; run until shutdown when `None`
    pub duration: Option<Duration>,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            duration: None,
        }
    }
}

/// Running statistics over the valid readings of a monitoring session
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MonitorStats {
    /// Readings attempted, including failed ones
    pub attempts: u64,
    /// Readings that produced a temperature
    pub count: u64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub sum: f64,
}

impl MonitorStats {
    pub fn record(&mut self, celsius: f64) {
        self.attempts += 1;
        self.count += 1;
        self.sum += celsius;
        self.min = Some(self.min.map_or(celsius, |m| m.min(celsius)));
        self.max = Some(self.max.map_or(celsius, |m| m.max(celsius)));
    }

    pub fn record_failure(&mut self) {
        self.attempts += 1;
    }

    pub fn average(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }

    /// Spread between the highest and lowest reading
    pub fn range(&self) -> Option<f64> {
        Some(self.max? - self.min?)
    }
}

/// Progress reported while monitoring
#[derive(Debug)]
pub enum MonitorEvent {
    /// A temperature was read; `stats` already includes it
    Reading {
        timestamp: DateTime<Local>,
        port: u16,
        celsius: f64,
        stats: MonitorStats,
    },
    /// The reading failed; monitoring continues
    ReadFailed {
        timestamp: DateTime<Local>,
        port: u16,
        error: ClientError,
    },
}

/// Why a monitoring session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    DurationElapsed,
    Cancelled,
}

/// Final report of a monitoring session
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonitorSummary {
    pub port: u16,
    pub reason: StopReason,
    pub elapsed: Duration,
    pub stats: MonitorStats,
}

impl<T: Transport> IoLinkMaster<T> {
    /// Read the temperature on `port` every `options.interval`
    ///
    /// Runs until `options.duration` has elapsed or `shutdown` resolves.
    /// Shutdown interrupts a pending request or sleep immediately and the
    /// statistics gathered so far are returned in the summary.
    pub async fn monitor_temperature<S, F>(
        &self,
        port: u16,
        options: MonitorOptions,
        shutdown: S,
        mut on_event: F,
    ) -> MonitorSummary
    where
        S: Future<Output = ()>,
        F: FnMut(MonitorEvent),
    {
        tokio::pin!(shutdown);

        let start = Instant::now();
        let mut stats = MonitorStats::default();

        info!(
            port,
            interval = ?options.interval,
            duration = ?options.duration,
            "Starting temperature monitoring"
        );

        let reason = loop {
            if options.duration.is_some_and(|d| start.elapsed() >= d) {
                break StopReason::DurationElapsed;
            }

            let reading = tokio::select! {
                biased;
                _ = &mut shutdown => break StopReason::Cancelled,
                reading = self.temperature_celsius(port) => reading,
            };

            let timestamp = Local::now();
            match reading {
                Ok(celsius) => {
                    stats.record(celsius);
                    on_event(MonitorEvent::Reading {
                        timestamp,
                        port,
                        celsius,
                        stats,
                    });
                }
                Err(error) => {
                    stats.record_failure();
                    debug!(port, error = %error, "Temperature reading failed");
                    on_event(MonitorEvent::ReadFailed {
                        timestamp,
                        port,
                        error,
                    });
                }
            }

            // Never sleep past the end of the session
            let pause = match options.duration {
                Some(d) => options.interval.min(d.saturating_sub(start.elapsed())),
                None => options.interval,
            };

            tokio::select! {
                biased;
                _ = &mut shutdown => break StopReason::Cancelled,
                _ = sleep(pause) => {}
            }
        };

        let summary = MonitorSummary {
            port,
            reason,
            elapsed: start.elapsed(),
            stats,
        };

        info!(
            port,
            reason = ?summary.reason,
            readings = stats.count,
            attempts = stats.attempts,
            "Temperature monitoring stopped"
        );
        summary
    }
}
