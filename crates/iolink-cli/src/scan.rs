//! `iolink scan` - table of every port on the master

use anyhow::Result;
use iolink_core::{IoLinkMaster, PortInfo, ScanResult, Transport};
use std::fmt::Write;

pub async fn run<T: Transport>(master: &IoLinkMaster<T>, json: bool) -> Result<()> {
    let scan = master.scan_all_ports().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&scan)?);
        return Ok(());
    }

    println!("IO-Link Master at {}", master.address());
    if scan.is_empty() {
        println!("No ports detected or connection failed");
        println!();
        println!("Common issues:");
        println!("  - Wrong IP address, check your network settings");
        println!("  - Device not powered on or not reachable");
        return Ok(());
    }

    print!("{}", render_table(&scan));

    let connected = scan.connected().count();
    println!();
    println!("Scan complete: {} connected device(s) on {} port(s)", connected, scan.len());
    if connected == 0 {
        println!("Check that sensors are properly connected and powered");
    }

    Ok(())
}

/// Format a scan as a fixed-width table
pub fn render_table(scan: &ScanResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<6}{:<26}{:<20}{:<14}{}",
        "Port", "Status", "Device", "Data", "Temperature"
    );

    for info in scan.iter() {
        let _ = writeln!(
            out,
            "{:<6}{:<26}{:<20}{:<14}{}",
            info.port,
            status_label(info),
            info.name.as_deref().unwrap_or("-"),
            info.data.as_deref().unwrap_or("-"),
            info.temperature_c
                .map(|t| format!("{:.1}°C", t))
                .unwrap_or_else(|| "-".to_string()),
        );
    }

    out
}

fn status_label(info: &PortInfo) -> String {
    match &info.status {
        Some(status) if info.is_connected() => format!("{} ({})", status.kind(), status),
        Some(status) => format!("No device connected ({})", status),
        None => "unavailable".to_string(),
    }
}
