//! `iolink monitor` - live temperature readout with statistics

use anyhow::Result;
use iolink_core::{IoLinkMaster, MonitorEvent, MonitorOptions, MonitorSummary, Transport};
use std::fmt::Write;
use tracing::warn;

/// Alert thresholds in Celsius
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Alerts {
    pub high: Option<f64>,
    pub low: Option<f64>,
}

impl Alerts {
    pub fn check(&self, celsius: f64) -> Option<String> {
        match (self.high, self.low) {
            (Some(high), _) if celsius > high => {
                Some(format!("HIGH TEMPERATURE ALERT: {:.1}°C", celsius))
            }
            (_, Some(low)) if celsius < low => {
                Some(format!("LOW TEMPERATURE ALERT: {:.1}°C", celsius))
            }
            _ => None,
        }
    }
}

pub async fn run<T: Transport>(
    master: &IoLinkMaster<T>,
    port: u16,
    options: MonitorOptions,
    alerts: Alerts,
) -> Result<()> {
    match master.device_status(port).await {
        Ok(status) if status.is_operational() => {}
        Ok(_) => {
            println!("No device connected on Port {}", port);
            println!("Run `iolink scan` to find connected devices");
            return Ok(());
        }
        Err(e) => {
            println!("Unable to read status of Port {}: {}", port, e);
            return Ok(());
        }
    }

    let name = master
        .device_name(port)
        .await
        .unwrap_or_else(|_| "Unknown".to_string());
    println!("Monitoring {} on Port {}", name, port);
    println!("Reading interval: {} seconds", options.interval.as_secs_f64());
    match options.duration {
        Some(duration) => println!("Duration: {} seconds", duration.as_secs_f64()),
        None => println!("Press Ctrl+C to stop and see statistics"),
    }
    println!();

    let summary = master
        .monitor_temperature(port, options, shutdown_signal(), |event| {
            println!("{}", format_event(&event));
            if let MonitorEvent::Reading { celsius, .. } = event {
                if let Some(alert) = alerts.check(celsius) {
                    println!("{}", alert);
                }
            }
        })
        .await;

    print!("{}", format_summary(&summary));
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Unable to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

pub fn format_event(event: &MonitorEvent) -> String {
    match event {
        MonitorEvent::Reading {
            timestamp,
            celsius,
            stats,
            ..
        } => {
            let mut line = format!("[{}] {:.1}°C", timestamp.format("%Y-%m-%d %H:%M:%S"), celsius);
            if stats.count > 1 {
                if let (Some(min), Some(max), Some(avg)) = (stats.min, stats.max, stats.average()) {
                    let _ = write!(
                        line,
                        " | Min: {:.1}°C | Max: {:.1}°C | Avg: {:.1}°C",
                        min, max, avg
                    );
                }
            }
            line
        }
        MonitorEvent::ReadFailed {
            timestamp,
            port,
            error,
        } => format!(
            "[{}] Failed to read temperature on Port {}: {}",
            timestamp.format("%Y-%m-%d %H:%M:%S"),
            port,
            error
        ),
    }
}

pub fn format_summary(summary: &MonitorSummary) -> String {
    let stats = &summary.stats;
    let elapsed = summary.elapsed.as_secs_f64();
    let mut out = String::new();

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", "=".repeat(60));
    let _ = writeln!(out, "MONITORING STATISTICS");
    let _ = writeln!(out, "{}", "=".repeat(60));
    let _ = writeln!(out, "Total readings: {}", stats.attempts);
    let _ = writeln!(out, "Total time: {:.1} seconds", elapsed);
    if stats.attempts > 0 {
        let _ = writeln!(out, "Average interval: {:.1} seconds", elapsed / stats.attempts as f64);
    }

    if let (Some(min), Some(max), Some(avg), Some(range)) =
        (stats.min, stats.max, stats.average(), stats.range())
    {
        let _ = writeln!(out, "Temperature statistics:");
        let _ = writeln!(out, "  Minimum: {:.1}°C", min);
        let _ = writeln!(out, "  Maximum: {:.1}°C", max);
        let _ = writeln!(out, "  Average: {:.1}°C", avg);
        let _ = writeln!(out, "  Range: {:.1}°C", range);
        let _ = writeln!(out, "  Valid readings: {}/{}", stats.count, stats.attempts);
    } else {
        let _ = writeln!(out, "No valid temperature readings");
    }

    let _ = writeln!(out);
    let _ = match summary.reason {
        iolink_core::StopReason::DurationElapsed => writeln!(out, "Monitoring completed"),
        iolink_core::StopReason::Cancelled => writeln!(out, "Monitoring stopped by user"),
    };
    out
}
