//! Console rendering: tables and the transmit progress bar

use arpscout_core::Interface;
use arpscout_proto::{MonitorReport, ProbeReport};
use comfy_table::Table;
use indicatif::{ProgressBar, ProgressStyle};

pub fn transmit_bar(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    if let Ok(style) =
        ProgressStyle::default_bar().template("Transmitting [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
    {
        bar.set_style(style.progress_chars("#>-"));
    }
    bar
}

pub fn interfaces_table(interfaces: &[Interface]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Name", "MAC Address", "IPv4 Address"]);
    for iface in interfaces {
        table.add_row(vec![
            iface.name.clone(),
            iface.mac.to_string(),
            iface
                .ipv4()
                .map(|ip| ip.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }
    table
}

pub fn monitor_table(report: &MonitorReport) -> Table {
    let mut hosts: Vec<_> = report.hosts.iter().collect();
    hosts.sort_by_key(|(ip, _)| **ip);

    let mut table = Table::new();
    table.set_header(vec!["IP Address", "MAC Address", "Count", "Last Seen"]);
    for (ip, obs) in hosts {
        table.add_row(vec![
            ip.to_string(),
            obs.mac.to_string(),
            obs.count.to_string(),
            format!("{}s ago", obs.last_seen.elapsed().as_secs()),
        ]);
    }
    table
}

pub fn probe_table(report: &ProbeReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["IP Address", "MAC Address"]);
    for (ip, mac) in &report.responses {
        table.add_row(vec![ip.to_string(), mac.to_string()]);
    }
    table
}
