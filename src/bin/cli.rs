//! GemDB CLI Client
//!
//! Command-line interface for interacting with GemDB.

use clap::{Parser, Subcommand};
use gemdb::network::Client;
use gemdb::protocol::{Command, Reply};

/// GemDB CLI
#[derive(Parser, Debug)]
#[command(name = "gemdb-cli")]
#[command(about = "CLI for the GemDB key-value store")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    server: String,

    /// API key
    #[arg(short = 'k', long, env = "API_KEY", hide_env_values = true)]
    api_key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a table
    CreateTable { name: String },

    /// Delete a table and all its keys
    DeleteTable { name: String },

    /// Set a key in a table
    Set {
        table: String,
        key: String,
        value: String,
    },

    /// Get a key from a table
    Get { table: String, key: String },

    /// Delete a key from a table
    Del { table: String, key: String },

    /// List tables
    Tables,

    /// List keys of a table
    Keys { table: String },

    /// Export all tables to a file on the server host
    Export { path: String },

    /// Create a document collection
    CreateCollection { name: String },

    /// Drop a document collection
    DropCollection { name: String },

    /// List document collections
    Collections,

    /// Insert a document
    Insert {
        collection: String,
        id: String,
        data: String,
    },

    /// Get a document
    GetDoc { collection: String, id: String },

    /// Delete a document
    DelDoc { collection: String, id: String },

    /// Find document IDs whose data equals a value
    Search { collection: String, value: String },

    /// Ping the server
    Ping,
}

impl From<Commands> for Command {
    fn from(command: Commands) -> Self {
        match command {
            Commands::CreateTable { name } => Command::CreateTable { name },
            Commands::DeleteTable { name } => Command::DeleteTable { name },
            Commands::Set { table, key, value } => Command::Set { table, key, value },
            Commands::Get { table, key } => Command::Get { table, key },
            Commands::Del { table, key } => Command::Delete { table, key },
            Commands::Tables => Command::ListTables,
            Commands::Keys { table } => Command::ListKeys { table },
            Commands::Export { path } => Command::Export { path },
            Commands::CreateCollection { name } => Command::CreateCollection { name },
            Commands::DropCollection { name } => Command::DropCollection { name },
            Commands::Collections => Command::ListCollections,
            Commands::Insert {
                collection,
                id,
                data,
            } => Command::InsertDocument {
                collection,
                id,
                data,
            },
            Commands::GetDoc { collection, id } => Command::GetDocument { collection, id },
            Commands::DelDoc { collection, id } => Command::DeleteDocument { collection, id },
            Commands::Search { collection, value } => {
                Command::SearchDocuments { collection, value }
            }
            Commands::Ping => Command::Ping,
        }
    }
}

fn main() {
    let args = Args::parse();

    let mut client = match Client::connect(&args.server, args.api_key) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("error: cannot connect to {}: {}", args.server, e);
            std::process::exit(1);
        }
    };

    match client.execute(args.command.into()) {
        Ok(reply) => print_reply(reply),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_reply(reply: Reply) {
    match reply {
        Reply::Done => println!("OK"),
        Reply::Pong => println!("PONG"),
        Reply::Value(value) => println!("{}", value),
        Reply::Document(document) => println!("{}\t{}", document.id, document.data),
        Reply::Tables(names)
        | Reply::Keys(names)
        | Reply::Collections(names)
        | Reply::Ids(names) => {
            for name in names {
                println!("{}", name);
            }
        }
    }
}
