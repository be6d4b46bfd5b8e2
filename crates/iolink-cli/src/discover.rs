//! `iolink discover` - find IO-Link Masters through the ARP table

use anyhow::Result;
use iolink_core::{IoLinkMaster, MasterConfig};
use iolink_discovery::interfaces::is_in_subnet;
use iolink_discovery::{discover, local_ipv4_interfaces, Candidate, CandidateReason, LocalInterface, ScannerConfig};

pub async fn run(config: &ScannerConfig, master_config: &MasterConfig, json: bool) -> Result<()> {
    let interfaces = local_ipv4_interfaces();
    let candidates = discover(config).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&candidates)?);
        return Ok(());
    }

    if !interfaces.iter().any(LocalInterface::is_link_local) {
        println!("Note: no local interface has a 169.254.x.x address;");
        println!("a master on its factory address may not be reachable.");
        println!();
    }

    if candidates.is_empty() {
        println!("No IO-Link Master candidates found");
        println!();
        println!("Troubleshooting tips:");
        println!("  - Ensure the IO-Link Master is powered on");
        println!("  - Check Ethernet cable connections");
        println!("  - Verify your computer is on the same network");
        return Ok(());
    }

    for candidate in &candidates {
        println!("{}", describe(candidate, &interfaces));
    }

    let Some(found) = candidates.iter().find(|c| c.verified) else {
        println!();
        println!("No IO-Link Master confirmed. Try these addresses in a web browser:");
        for candidate in &candidates {
            println!("  http://{}", candidate.ip());
        }
        return Ok(());
    };

    println!();
    println!("IO-Link Master found at {}", found.ip());
    println!("Web interface: http://{}", found.ip());

    let master = IoLinkMaster::new(MasterConfig {
        address: found.ip().to_string(),
        ..master_config.clone()
    });
    match master.try_port_count().await {
        Ok(count) => println!("Device has {} ports", count),
        Err(e) => println!("Basic test failed: {}", e),
    }

    Ok(())
}

fn describe(candidate: &Candidate, interfaces: &[LocalInterface]) -> String {
    let reason = match candidate.reason {
        CandidateReason::IfmMac => "ifm MAC",
        CandidateReason::LinkLocal => "link-local",
    };
    let verdict = if candidate.verified {
        "IO-Link Master"
    } else {
        "not confirmed"
    };
    let via = interfaces
        .iter()
        .find(|iface| is_in_subnet(candidate.ip(), iface.ip, iface.prefix_len))
        .map(|iface| iface.name.as_str())
        .unwrap_or(candidate.entry.interface.as_str());

    format!(
        "{:<17}{:<19}{:<12}{:<10}{}",
        candidate.ip().to_string(),
        candidate.entry.mac,
        reason,
        via,
        verdict
    )
}
