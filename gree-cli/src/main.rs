use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use gree_lib::properties::{DEFAULT_STATUS, OPTIONAL_FEATURES};
use gree_lib::{ClientConfig, CommandValue, GreeDevice};
use serde_json::Value;
use std::path::PathBuf;
use std::process;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Talk to a Gree-protocol air conditioner over the LAN.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Hostname or IP address of the unit
    #[arg(long, global = true)]
    host: Option<String>,
    /// UDP port of the unit (default 7000)
    #[arg(short, long, global = true)]
    port: Option<u16>,
    /// Device MAC / identifier, separators allowed
    #[arg(short, long, global = true)]
    mac: Option<String>,
    /// Encryption version: 1 (ECB) or 2 (GCM)
    #[arg(short, long = "encryption-version", global = true)]
    encryption_version: Option<u8>,
    /// Device key from an earlier bind; skips the handshake
    #[arg(short, long, global = true)]
    key: Option<String>,
    /// Reply timeout in seconds
    #[arg(short, long, global = true)]
    timeout: Option<u64>,
    /// JSON config file; command-line flags override its values
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the bind handshake and print the device key
    Bind,
    /// Read properties (default: the standard status set)
    Status { names: Vec<String> },
    /// Write properties given as NAME=VALUE, VALUE being a JSON scalar
    Set {
        #[arg(required = true)]
        assignments: Vec<String>,
    },
    /// Check which optional features the unit answers for
    Probe { names: Vec<String> },
}

fn setup_logging(verbosity: &Verbosity<InfoLevel>) {
    let filter = EnvFilter::builder()
        .with_default_directive(verbosity.tracing_level_filter().into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli.verbose);

    if let Err(e) = run(cli).await {
        error!("{:?}", e);
        process::exit(1);
    }

    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;
    let device = config.connect().context("Failed to create client")?;

    match cli.command {
        Command::Bind => {
            let key = device
                .try_bind()
                .await
                .with_context(|| format!("Bind with {} failed", config.host))?;
            println!("{}", key.to_ascii_lossy());
        }
        Command::Status { names } => {
            ensure_bound(&device).await?;
            let names = names_or(names, DEFAULT_STATUS);
            let values = device.get_status(&names).await.context("Status query failed")?;
            for (name, value) in names.iter().zip(values) {
                println!("{} = {}", name, value);
            }
        }
        Command::Set { assignments } => {
            ensure_bound(&device).await?;
            let (names, values) = parse_assignments(&assignments)?;
            let ack = device
                .send_command(&names, values)
                .await
                .context("Command failed")?;
            match ack.result_code() {
                Some(code) => println!("ok (r = {})", code),
                None => println!("ok"),
            }
        }
        Command::Probe { names } => {
            ensure_bound(&device).await?;
            let names = names_or(names, OPTIONAL_FEATURES);
            let present = device.probe_all(&names).await;
            for name in &names {
                let state = if present.contains(name) { "present" } else { "absent" };
                println!("{}: {}", name, state);
            }
        }
    }

    Ok(())
}

/// Config file first, then command-line overrides
fn resolve_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => {
            let (Some(host), Some(mac)) = (&cli.host, &cli.mac) else {
                bail!("--host and --mac are required when no --config is given");
            };
            ClientConfig::new(host.clone(), mac.clone())
        }
    };

    if let Some(host) = &cli.host {
        config.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(mac) = &cli.mac {
        config.mac = mac.clone();
    }
    if let Some(version) = cli.encryption_version {
        config.encryption_version = version;
    }
    if let Some(key) = &cli.key {
        config.encryption_key = Some(key.clone());
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }

    config.validate().context("Invalid client configuration")?;
    Ok(config)
}

async fn ensure_bound(device: &GreeDevice) -> Result<()> {
    if !device.is_bound().await {
        info!("No device key configured, binding first");
        device.try_bind().await.context("Bind failed")?;
    }
    Ok(())
}

fn names_or(names: Vec<String>, defaults: &[&str]) -> Vec<String> {
    if names.is_empty() {
        defaults.iter().map(|name| name.to_string()).collect()
    } else {
        names
    }
}

/// Split `NAME=VALUE` pairs, keeping argument order.
/// Values that are not valid JSON are sent as text.
fn parse_assignments(assignments: &[String]) -> Result<(Vec<String>, Vec<CommandValue>)> {
    let mut names = Vec::with_capacity(assignments.len());
    let mut values = Vec::with_capacity(assignments.len());

    for assignment in assignments {
        let Some((name, raw)) = assignment.split_once('=') else {
            bail!("Expected NAME=VALUE, got `{}`", assignment);
        };
        if name.is_empty() {
            bail!("Missing property name in `{}`", assignment);
        }
        let json = serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        let value = CommandValue::try_from(json).with_context(|| format!("Cannot send value for {}", name))?;
        names.push(name.to_string());
        values.push(value);
    }

    Ok((names, values))
}
