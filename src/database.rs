//! Database facade
//!
//! Owns the table engine and the collection registry and routes commands to
//! them. This is the one object shared by all connection handlers.

use std::path::Path;

use crate::collection::{Collections, Document};
use crate::config::Config;
use crate::engine::Engine;
use crate::error::Result;
use crate::protocol::{Command, Reply};

/// Table engine + document collections
pub struct Database {
    engine: Engine,
    collections: Collections,
}

impl Database {
    /// Open the table engine and start an empty collection registry
    pub fn open(config: Config) -> Result<Self> {
        let collections = Collections::new(config.document_ttl);
        let engine = Engine::open(config)?;
        Ok(Self {
            engine,
            collections,
        })
    }

    /// Execute a command
    ///
    /// Routes commands to appropriate handlers
    pub fn execute(&self, command: Command) -> Result<Reply> {
        if command.is_mutation() {
            tracing::debug!("Executing {:?}", command.command_type());
        } else {
            tracing::trace!("Executing {:?}", command.command_type());
        }

        let reply = match command {
            // Tables
            Command::CreateTable { name } => {
                self.engine.create_table(&name)?;
                Reply::Done
            }
            Command::DeleteTable { name } => {
                self.engine.delete_table(&name)?;
                Reply::Done
            }
            Command::Set { table, key, value } => {
                self.engine.set(&table, &key, &value)?;
                Reply::Done
            }
            Command::Get { table, key } => Reply::Value(self.engine.get(&table, &key)?),
            Command::Delete { table, key } => {
                self.engine.delete(&table, &key)?;
                Reply::Done
            }
            Command::ListTables => Reply::Tables(self.engine.list_tables()),
            Command::ListKeys { table } => Reply::Keys(self.engine.list_keys(&table)?),
            Command::Export { path } => {
                self.engine.export_to_file(Path::new(&path))?;
                Reply::Done
            }

            // Collections
            Command::CreateCollection { name } => {
                self.collections.create_collection(&name)?;
                Reply::Done
            }
            Command::DropCollection { name } => {
                self.collections.drop_collection(&name)?;
                Reply::Done
            }
            Command::ListCollections => Reply::Collections(self.collections.list_collections()),
            Command::InsertDocument {
                collection,
                id,
                data,
            } => {
                self.collections
                    .get_collection(&collection)?
                    .insert_document(Document::new(id, data))?;
                Reply::Done
            }
            Command::GetDocument { collection, id } => {
                Reply::Document(self.collections.get_collection(&collection)?.get_document(&id)?)
            }
            Command::DeleteDocument { collection, id } => {
                self.collections
                    .get_collection(&collection)?
                    .delete_document(&id)?;
                Reply::Done
            }
            Command::SearchDocuments { collection, value } => Reply::Ids(
                self.collections
                    .get_collection(&collection)?
                    .search_by_value(&value),
            ),

            Command::Ping => Reply::Pong,
        };

        Ok(reply)
    }

    /// The table engine
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// The collection registry
    pub fn collections(&self) -> &Collections {
        &self.collections
    }
}
