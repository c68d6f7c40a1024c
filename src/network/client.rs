//! Client
//!
//! Blocking client for a GemDB server. One request in flight at a time.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};

use crate::collection::Document;
use crate::error::{GemError, Result};
use crate::protocol::{read_response, write_request, Command, Reply, Request};

/// Connection to a GemDB server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    api_key: String,
}

impl Client {
    /// Connect to `addr`, sending `api_key` with every request
    pub fn connect(addr: impl ToSocketAddrs, api_key: impl Into<String>) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
            api_key: api_key.into(),
        })
    }

    /// Send a command and wait for its reply
    ///
    /// Failures reported by the server come back as `GemError::Remote`.
    pub fn execute(&mut self, command: Command) -> Result<Reply> {
        let request = Request::new(self.api_key.clone(), command);
        write_request(&mut self.writer, &request)?;
        read_response(&mut self.reader)?.into_reply()
    }

    // =========================================================================
    // Tables
    // =========================================================================

    pub fn create_table(&mut self, name: &str) -> Result<()> {
        self.expect_done(Command::CreateTable {
            name: name.to_string(),
        })
    }

    pub fn delete_table(&mut self, name: &str) -> Result<()> {
        self.expect_done(Command::DeleteTable {
            name: name.to_string(),
        })
    }

    pub fn set(&mut self, table: &str, key: &str, value: &str) -> Result<()> {
        self.expect_done(Command::Set {
            table: table.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    pub fn get(&mut self, table: &str, key: &str) -> Result<String> {
        match self.execute(Command::Get {
            table: table.to_string(),
            key: key.to_string(),
        })? {
            Reply::Value(value) => Ok(value),
            other => Err(unexpected(other)),
        }
    }

    pub fn delete(&mut self, table: &str, key: &str) -> Result<()> {
        self.expect_done(Command::Delete {
            table: table.to_string(),
            key: key.to_string(),
        })
    }

    pub fn list_tables(&mut self) -> Result<Vec<String>> {
        match self.execute(Command::ListTables)? {
            Reply::Tables(tables) => Ok(tables),
            other => Err(unexpected(other)),
        }
    }

    pub fn list_keys(&mut self, table: &str) -> Result<Vec<String>> {
        match self.execute(Command::ListKeys {
            table: table.to_string(),
        })? {
            Reply::Keys(keys) => Ok(keys),
            other => Err(unexpected(other)),
        }
    }

    /// Ask the server to export its tables to a path on the server host
    pub fn export(&mut self, path: &str) -> Result<()> {
        self.expect_done(Command::Export {
            path: path.to_string(),
        })
    }

    // =========================================================================
    // Collections
    // =========================================================================

    pub fn create_collection(&mut self, name: &str) -> Result<()> {
        self.expect_done(Command::CreateCollection {
            name: name.to_string(),
        })
    }

    pub fn drop_collection(&mut self, name: &str) -> Result<()> {
        self.expect_done(Command::DropCollection {
            name: name.to_string(),
        })
    }

    pub fn list_collections(&mut self) -> Result<Vec<String>> {
        match self.execute(Command::ListCollections)? {
            Reply::Collections(names) => Ok(names),
            other => Err(unexpected(other)),
        }
    }

    pub fn insert_document(&mut self, collection: &str, id: &str, data: &str) -> Result<()> {
        self.expect_done(Command::InsertDocument {
            collection: collection.to_string(),
            id: id.to_string(),
            data: data.to_string(),
        })
    }

    pub fn get_document(&mut self, collection: &str, id: &str) -> Result<Document> {
        match self.execute(Command::GetDocument {
            collection: collection.to_string(),
            id: id.to_string(),
        })? {
            Reply::Document(document) => Ok(document),
            other => Err(unexpected(other)),
        }
    }

    pub fn delete_document(&mut self, collection: &str, id: &str) -> Result<()> {
        self.expect_done(Command::DeleteDocument {
            collection: collection.to_string(),
            id: id.to_string(),
        })
    }

    pub fn search_documents(&mut self, collection: &str, value: &str) -> Result<Vec<String>> {
        match self.execute(Command::SearchDocuments {
            collection: collection.to_string(),
            value: value.to_string(),
        })? {
            Reply::Ids(ids) => Ok(ids),
            other => Err(unexpected(other)),
        }
    }

    /// Health check
    pub fn ping(&mut self) -> Result<()> {
        match self.execute(Command::Ping)? {
            Reply::Pong => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn expect_done(&mut self, command: Command) -> Result<()> {
        match self.execute(command)? {
            Reply::Done => Ok(()),
            other => Err(unexpected(other)),
        }
    }
}

fn unexpected(reply: Reply) -> GemError {
    GemError::Protocol(format!("unexpected reply: {:?}", reply))
}
