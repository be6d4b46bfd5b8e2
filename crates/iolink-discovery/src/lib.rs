//! IO-Link Discovery - Finding IO-Link Masters on the local network
//!
//! This crate provides:
//! - ARP table reading with ifm OUI recognition
//! - Link-local fallback for masters still on their factory address
//! - HTTP landing page probing to confirm a candidate

pub mod arp;
pub mod interfaces;
pub mod probe;
pub mod scanner;

pub use arp::{get_arp_table, is_ifm_mac, ArpEntry, ArpState};
pub use interfaces::{local_ipv4_interfaces, LocalInterface};
pub use scanner::{discover, select_candidates, Candidate, CandidateReason, ScannerConfig};
