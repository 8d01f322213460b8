//! arpscout command-line interface

mod args;
mod render;

use args::{Cli, Commands};
use arpscout_core::{CancelToken, Error, Interface, MacAddr, Result};
use arpscout_proto::{monitor, probe, targets, ProbeConfig};
use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Duration;
use tracing::Level;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_tracing(cli.verbose);

    let cancel = CancelToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nCancellation requested (Ctrl+C), shutting down...");
            signal_cancel.cancel();
        }
    });

    // The session loops are blocking by design; keep them off the runtime.
    let result = tokio::task::spawn_blocking(move || dispatch(cli.command, &cancel))
        .await
        .unwrap_or_else(|e| Err(Error::Channel(format!("worker task failed: {}", e))));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::Interrupted) => {
            eprintln!("\nProbe was interrupted.");
            ExitCode::from(130)
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn dispatch(command: Commands, cancel: &CancelToken) -> Result<()> {
    match command {
        Commands::Interfaces => cmd_interfaces(),
        Commands::Monitor { interface } => cmd_monitor(&interface, cancel),
        Commands::Probe {
            interface,
            range,
            source_mac,
            send_interval_ms,
            timeout,
            no_shuffle,
            yes,
        } => cmd_probe(
            &interface,
            &range,
            source_mac.as_deref(),
            Duration::from_millis(send_interval_ms),
            Duration::from_secs(timeout),
            !no_shuffle,
            yes,
            cancel,
        ),
    }
}

fn cmd_interfaces() -> Result<()> {
    let interfaces = Interface::list_all();
    println!("{}", render::interfaces_table(&interfaces));
    Ok(())
}

fn cmd_monitor(name: &str, cancel: &CancelToken) -> Result<()> {
    let iface = Interface::by_name(name)?;
    let mut source = iface.open_source()?;

    println!("Listening for ARP frames on {}...", iface);
    println!("Running silent, nothing will be transmitted. Press Ctrl+C to stop.");

    let report = monitor::run(&mut source, cancel, |event| println!("{}", event))?;
    drop(source);

    println!();
    println!(
        "ARP monitoring stopped. Seen {} hosts in {} seconds.",
        report.hosts.len(),
        report.elapsed.as_secs()
    );
    println!("{}", render::monitor_table(&report));
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_probe(
    interface: &str,
    range: &str,
    source_mac: Option<&str>,
    send_interval: Duration,
    reply_timeout: Duration,
    shuffle: bool,
    skip_confirmation: bool,
    cancel: &CancelToken,
) -> Result<()> {
    let iface = Interface::by_name(interface)?;

    let source_mac = match source_mac {
        None => iface.mac,
        Some("random") => {
            let mac = MacAddr::random();
            println!("Using a random MAC address: {}", mac);
            mac
        }
        Some(s) => s.parse()?,
    };

    let probe_targets = targets::resolve_probe_targets(range)?;
    if probe_targets.is_empty() {
        return Err(Error::InvalidAddressExpression(format!(
            "{}: no usable host addresses",
            range
        )));
    }

    if !skip_confirmation && !confirm_transmit(probe_targets.len(), &iface.name)? {
        println!("Probe aborted, nothing transmitted.");
        return Ok(());
    }

    let mut config = ProbeConfig::new(source_mac);
    config.shuffle = shuffle;
    config.send_interval = send_interval;
    config.reply_timeout = reply_timeout;

    let listener_source = iface.open_source()?;
    let mut sink = iface.open_sink()?;

    println!(
        "ARP probing has begun. Sending requests to {} hosts. Press Ctrl+C to stop.",
        probe_targets.len()
    );
    let bar = render::transmit_bar(probe_targets.len() as u64);

    let result = probe::run(
        &mut sink,
        listener_source,
        probe_targets,
        &config,
        cancel,
        |sent, _total| bar.set_position(sent as u64),
    );

    let report = match result {
        Ok(report) => {
            bar.finish_and_clear();
            report
        }
        Err(e) => {
            bar.abandon();
            return Err(e);
        }
    };

    println!(
        "Seen {} hosts in {} seconds.",
        report.responses.len(),
        report.elapsed.as_secs()
    );
    println!("{}", render::probe_table(&report));
    Ok(())
}

fn confirm_transmit(count: usize, interface: &str) -> Result<bool> {
    print!(
        "About to transmit {} ARP request(s) on '{}'. Continue? [y/N]: ",
        count, interface
    );
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(matches!(
        line.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
