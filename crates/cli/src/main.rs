mod call;
mod config;
mod run;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ed25519_dalek::SigningKey;
use ezballot_core::{Command, Identity, IdentityGate, TracingNotifier};
use rand::rngs::OsRng;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::call::{SignedCall, identity_of};
use crate::config::BallotConfig;

#[derive(Parser)]
#[command(name = "ezballot")]
#[command(about = "Offline host for an ezballot election")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "ballot.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a signing key and print it with its identity
    Keygen,

    /// Sign a command and print the call as one JSON line
    Sign {
        /// Hex-encoded 32-byte secret key
        #[arg(long)]
        secret: String,

        /// Command as JSON, e.g. '{"op": "cast_vote", "proposal_index": 1}'
        command: String,
    },

    /// Replay a file of signed calls against a fresh election
    Run {
        /// File with one signed call per line
        calls: PathBuf,

        /// Administrator identity, overriding the config file
        #[arg(long)]
        administrator: Option<Identity>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = BallotConfig::load(&cli.config);
    let config = loaded.as_ref().cloned().unwrap_or_default();

    // Initialize logging
    let log_level = if cli.verbose {
        "debug"
    } else {
        config.log.level.as_str()
    };
    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "ezballot={},ezballot_core={},{}",
            log_level, log_level, log_level
        ))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = &loaded {
        warn!("Failed to load config {}: {}, using defaults", cli.config.display(), e);
    }

    match cli.command {
        Commands::Keygen => {
            let key = SigningKey::generate(&mut OsRng);
            println!("secret:   {}", hex::encode(key.to_bytes()));
            println!("identity: {}", identity_of(&key.verifying_key()));
        }

        Commands::Sign { secret, command } => {
            let mut bytes = [0u8; 32];
            hex::decode_to_slice(secret.trim(), &mut bytes)
                .context("secret must be 64 hex characters")?;
            let key = SigningKey::from_bytes(&bytes);

            let command: Command =
                serde_json::from_str(&command).context("command is not valid JSON")?;
            let call = SignedCall::new(command, &key)?;
            println!("{}", serde_json::to_string(&call)?);
        }

        Commands::Run {
            calls,
            administrator,
        } => {
            let administrator = administrator
                .or(config.election.administrator)
                .context(
                    "no administrator given: set election.administrator or pass --administrator",
                )?;

            let file = File::open(&calls)
                .with_context(|| format!("failed to open {}", calls.display()))?;

            info!("Replaying {}", calls.display());
            let report = run::run_calls(
                IdentityGate::new(administrator),
                Box::new(TracingNotifier),
                BufReader::new(file),
            )?;

            println!("{}", serde_json::to_string_pretty(&report.snapshot)?);
            println!("hash: {}", report.hash);
            info!(
                "{} calls accepted, {} rejected",
                report.accepted, report.rejected
            );
        }
    }

    Ok(())
}
