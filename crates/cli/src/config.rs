//! `--port`/`--boot`/`--m`/`--replicas` (§6). Logging verbosity is read
//! separately from `RUST_LOG`/`-v` via `tracing-subscriber`'s `EnvFilter`
//! in `main`, not carried here.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about = "A single node of a Chord-like replicated ring DHT.")]
pub struct Args {
    /// Port this node listens on.
    #[arg(long)]
    pub port: u16,

    /// `host:port` of an existing ring member to join. Pass this node's
    /// own listen address to start a brand-new ring instead.
    #[arg(long)]
    pub boot: String,

    /// Keyspace width in bits.
    #[arg(long, default_value_t = 16)]
    pub m: u32,

    /// Replication factor.
    #[arg(long, default_value_t = 3)]
    pub replicas: u32,

    /// Increase log verbosity; repeatable. Ignored if `RUST_LOG` is set.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn listen_host(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }
}
