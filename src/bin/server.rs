//! GemDB Server Binary
//!
//! Starts the TCP server for GemDB.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use gemdb::network::Server;
use gemdb::{AccessGate, Config, Database, PersistStrategy};
use tracing_subscriber::{fmt, EnvFilter};

/// GemDB Server
#[derive(Parser, Debug)]
#[command(name = "gemdb-server")]
#[command(about = "Table key-value store with TTL document collections")]
#[command(version)]
struct Args {
    /// Snapshot file for tables
    #[arg(short, long, default_value = "data.json")]
    data_file: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    listen: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// API key file, read (or created) when API_KEY is unset
    #[arg(short = 'k', long, default_value = "api.json")]
    api_key_file: String,

    /// Document retention window in seconds
    #[arg(short = 't', long, default_value = "300")]
    document_ttl_secs: u64,

    /// How the snapshot file is rewritten
    #[arg(short, long, value_enum, default_value_t = PersistArg::Atomic)]
    persist: PersistArg,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PersistArg {
    /// Temp file + rename
    Atomic,
    /// Rewrite in place
    Overwrite,
}

impl From<PersistArg> for PersistStrategy {
    fn from(arg: PersistArg) -> Self {
        match arg {
            PersistArg::Atomic => PersistStrategy::AtomicRename,
            PersistArg::Overwrite => PersistStrategy::Overwrite,
        }
    }
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,gemdb=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("GemDB Server v{}", gemdb::VERSION);
    tracing::info!("Data file: {}", args.data_file);
    tracing::info!("Listen address: {}", args.listen);

    // Build config from args
    let config = Config::builder()
        .data_file(&args.data_file)
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .api_key_file(&args.api_key_file)
        .document_ttl(Duration::from_secs(args.document_ttl_secs))
        .persist_strategy(args.persist.into())
        .build();

    let gate = match AccessGate::load(&config.api_key_file) {
        Ok(gate) => gate,
        Err(e) => {
            tracing::error!("Failed to resolve API key: {}", e);
            std::process::exit(1);
        }
    };

    // Open database
    let database = match Database::open(config.clone()) {
        Ok(db) => Arc::new(db),
        Err(e) => {
            tracing::error!("Failed to open database: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Database initialized successfully");

    // Start server
    let server = match Server::bind(config, database, gate) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", args.listen, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
