use std::{
    io::{self, BufRead, BufReader, Write},
    path::PathBuf,
    time::Duration,
};

use anyhow::Context;
use clap::Parser;
use fan_firmware::{protocol, Override};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

mod config;
mod events;
mod notify;

use crate::{
    config::{Config, RawConfig},
    events::{parse_line, Event},
    notify::Notifier,
};

#[derive(Parser, Debug)]
#[command(about, author, version)]
struct Args {
    /// Path to config file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
}

/// Everything the main loop reacts to
#[derive(Debug)]
enum Input {
    /// A line reported by the firmware
    Event(Event),
    /// An override typed on stdin
    Command(Override),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Parse command line arguments
    let args = Args::parse();

    // Parse config
    let raw_config = match RawConfig::load(&args.config) {
        Ok(val) => val,
        Err(e) => {
            println!("Error: Failed to load config: {:#}", e);
            println!();
            println!(
                "Example config:\n\n{}",
                toml::to_string(&RawConfig::example())?
            );
            return Ok(());
        }
    };
    let config: Config = raw_config.try_into()?;

    let notifier = config.threema.as_ref().map(Notifier::new).transpose()?;
    if notifier.is_none() {
        info!("Threema not configured, notifications disabled");
    }

    // Connect to serial device
    let port_name = config
        .serial
        .port
        .to_str()
        .context("Serial port path is not valid UTF-8")?;
    let raw_port = serialport::new(port_name, config.serial.baudrate)
        .timeout(Duration::from_secs(30))
        .open()
        .context(format!(
            "Failed to open serial port at {:?}",
            config.serial.port
        ))?;
    let mut port_writer = raw_port
        .try_clone()
        .context("Failed to clone serial port handle")?;
    info!(port = ?config.serial.port, "Serial port opened");

    let (tx, mut rx) = mpsc::channel(64);

    // Buffered reading
    let serial_tx = tx.clone();
    tokio::task::spawn_blocking(move || {
        let mut port = BufReader::new(raw_port);
        let mut line_buffer = String::new();
        loop {
            match port.read_line(&mut line_buffer) {
                Ok(0) => break,
                Ok(_size) => match parse_line(line_buffer.trim()) {
                    Some(event) => {
                        if serial_tx.blocking_send(Input::Event(event)).is_err() {
                            break;
                        }
                    }
                    None => debug!(line = line_buffer.trim(), "Ignoring line"),
                },
                Err(e) if e.kind() == io::ErrorKind::TimedOut => {
                    warn!("No data received from serial port");
                }
                Err(e) => error!("Error while reading: {}", e),
            }
            line_buffer.clear();
        }
        warn!("Serial port closed");
    });

    // Manual overrides
    tokio::task::spawn_blocking(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            match parse_user_command(&line) {
                Some(command) => {
                    if tx.blocking_send(Input::Command(command)).is_err() {
                        break;
                    }
                }
                None => warn!(input = line.trim(), "Unknown command, use 'on' or 'off'"),
            }
        }
    });

    // Main loop
    while let Some(input) = rx.recv().await {
        match input {
            Input::Event(event) => process_event(&event, notifier.as_ref()).await,
            Input::Command(command) => {
                info!(command = command.name(), "Sending override");
                if let Err(e) = writeln!(port_writer, "{}", command.command()) {
                    error!("Failed to send override: {}", e);
                }
            }
        }
    }

    Ok(())
}

/// Parse an override typed by the user.
fn parse_user_command(line: &str) -> Option<Override> {
    match line.trim().to_ascii_lowercase().as_str() {
        "on" => Some(Override::ForceOn),
        "off" => Some(Override::ForceOff),
        other => protocol::parse_command(other.as_bytes()),
    }
}

/// The notification text for an event, if it deserves one.
fn notification(event: &Event) -> Option<&'static str> {
    match event {
        Event::Relay(true) => Some("Fan switched on"),
        Event::Relay(false) => Some("Fan switched off"),
        _ => None,
    }
}

async fn process_event(event: &Event, notifier: Option<&Notifier>) {
    match event {
        Event::Update(update) => debug!(?update, "Status"),
        Event::Error(message) => warn!("Firmware error: {}", message),
        Event::ClockJump { from, to } => warn!(from, to, "Firmware clock jumped"),
        other => info!(event = ?other, "Event"),
    }
    if let (Some(text), Some(notifier)) = (notification(event), notifier) {
        notifier.notify(text).await;
    }
}
