use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use pathfinder_wire::{CodecConfig, Message, ProtocolIdentity};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "pfwire", version, about = "Encode, decode and inspect pathfinder wire frames")]
struct Cli {
    /// Codec config (TOML) with the compression registry and limits.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct ProtocolArgs {
    #[arg(long, default_value = "")]
    subnet: String,
    #[arg(long, default_value = "Plaintext")]
    encryption: String,
}

impl ProtocolArgs {
    fn identity(&self) -> ProtocolIdentity {
        ProtocolIdentity::new(self.subnet.as_str(), self.encryption.as_str())
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the protocol id for a subnet and encryption scheme.
    ProtocolId {
        #[command(flatten)]
        protocol: ProtocolArgs,
    },
    /// Build a message and print its frame as hex.
    Encode {
        #[command(flatten)]
        protocol: ProtocolArgs,
        #[arg(long = "type")]
        msg_type: String,
        #[arg(long)]
        sender: String,
        /// Compression candidates in preference order.
        #[arg(long = "compression")]
        compression: Vec<String>,
        /// Fixed timestamp instead of the current UTC second.
        #[arg(long)]
        timestamp: Option<u64>,
        /// Omit the outer size header.
        #[arg(long)]
        sizeless: bool,
        payload: Vec<String>,
    },
    /// Decode a hex frame and print its fields.
    Decode {
        #[command(flatten)]
        protocol: ProtocolArgs,
        #[arg(long = "compression")]
        compression: Vec<String>,
        #[arg(long)]
        sizeless: bool,
        frame: String,
    },
    /// Split a file of back-to-back frames and summarise each.
    Split {
        #[command(flatten)]
        protocol: ProtocolArgs,
        #[arg(long = "compression")]
        compression: Vec<String>,
        path: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_config(path: Option<&PathBuf>) -> Result<CodecConfig> {
    match path {
        Some(path) => CodecConfig::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(CodecConfig::default()),
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_ref())?;
    match cli.command {
        Command::ProtocolId { protocol } => {
            println!("{}", protocol.identity().id());
        }
        Command::Encode { protocol, msg_type, sender, compression, timestamp, sizeless, payload } => {
            let payload = payload.into_iter().map(String::into_bytes).collect();
            let msg = match timestamp {
                Some(timestamp) => Message::with_timestamp(
                    protocol.identity(),
                    msg_type,
                    sender,
                    payload,
                    compression,
                    timestamp,
                ),
                None => Message::new(protocol.identity(), msg_type, sender, payload, compression),
            };
            println!("{}", commands::encode(&config.build_codec()?, &msg, sizeless)?);
        }
        Command::Decode { protocol, compression, sizeless, frame } => {
            let codec = config.build_codec()?;
            print!("{}", commands::decode(&codec, protocol.identity(), &frame, sizeless, &compression)?);
        }
        Command::Split { protocol, compression, path } => {
            print!("{}", commands::split(&config, protocol.identity(), &path, &compression)?);
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if let Err(err) = run(cli) {
        eprintln!("pfwire error: {err:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_encode_arguments() {
        let cli = Cli::parse_from([
            "pfwire",
            "encode",
            "--subnet",
            "hi",
            "--type",
            "test",
            "--sender",
            "test sender",
            "--compression",
            "gzip",
            "--compression",
            "zlib",
            "test1",
            "test2",
        ]);
        match cli.command {
            Command::Encode { protocol, compression, payload, sizeless, .. } => {
                assert_eq!(protocol.identity(), ProtocolIdentity::new("hi", "Plaintext"));
                assert_eq!(compression, vec!["gzip", "zlib"]);
                assert_eq!(payload, vec!["test1", "test2"]);
                assert!(!sizeless);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
