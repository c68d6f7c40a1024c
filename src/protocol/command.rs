//! Command definitions
//!
//! Represents commands from clients.

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    CreateTable = 0x01,
    DeleteTable = 0x02,
    Set = 0x03,
    Get = 0x04,
    Delete = 0x05,
    ListTables = 0x06,
    ListKeys = 0x07,
    Export = 0x08,
    CreateCollection = 0x10,
    DropCollection = 0x11,
    ListCollections = 0x12,
    InsertDocument = 0x13,
    GetDocument = 0x14,
    DeleteDocument = 0x15,
    SearchDocuments = 0x16,
    Ping = 0x20,
}

impl CommandType {
    /// Parse a command byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        let command_type = match byte {
            0x01 => CommandType::CreateTable,
            0x02 => CommandType::DeleteTable,
            0x03 => CommandType::Set,
            0x04 => CommandType::Get,
            0x05 => CommandType::Delete,
            0x06 => CommandType::ListTables,
            0x07 => CommandType::ListKeys,
            0x08 => CommandType::Export,
            0x10 => CommandType::CreateCollection,
            0x11 => CommandType::DropCollection,
            0x12 => CommandType::ListCollections,
            0x13 => CommandType::InsertDocument,
            0x14 => CommandType::GetDocument,
            0x15 => CommandType::DeleteDocument,
            0x16 => CommandType::SearchDocuments,
            0x20 => CommandType::Ping,
            _ => return None,
        };
        Some(command_type)
    }

    /// Number of string fields the command carries (API key excluded)
    pub fn field_count(self) -> usize {
        match self {
            CommandType::ListTables | CommandType::ListCollections | CommandType::Ping => 0,
            CommandType::CreateTable
            | CommandType::DeleteTable
            | CommandType::ListKeys
            | CommandType::Export
            | CommandType::CreateCollection
            | CommandType::DropCollection => 1,
            CommandType::Get
            | CommandType::Delete
            | CommandType::GetDocument
            | CommandType::DeleteDocument
            | CommandType::SearchDocuments => 2,
            CommandType::Set | CommandType::InsertDocument => 3,
        }
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // -------------------------------------------------------------------------
    // Tables
    // -------------------------------------------------------------------------
    CreateTable { name: String },
    DeleteTable { name: String },
    Set { table: String, key: String, value: String },
    Get { table: String, key: String },
    Delete { table: String, key: String },
    ListTables,
    ListKeys { table: String },

    /// Export the table snapshot to a server-side path
    Export { path: String },

    // -------------------------------------------------------------------------
    // Collections
    // -------------------------------------------------------------------------
    CreateCollection { name: String },
    DropCollection { name: String },
    ListCollections,
    InsertDocument { collection: String, id: String, data: String },
    GetDocument { collection: String, id: String },
    DeleteDocument { collection: String, id: String },
    SearchDocuments { collection: String, value: String },

    /// Ping (health check)
    Ping,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::CreateTable { .. } => CommandType::CreateTable,
            Command::DeleteTable { .. } => CommandType::DeleteTable,
            Command::Set { .. } => CommandType::Set,
            Command::Get { .. } => CommandType::Get,
            Command::Delete { .. } => CommandType::Delete,
            Command::ListTables => CommandType::ListTables,
            Command::ListKeys { .. } => CommandType::ListKeys,
            Command::Export { .. } => CommandType::Export,
            Command::CreateCollection { .. } => CommandType::CreateCollection,
            Command::DropCollection { .. } => CommandType::DropCollection,
            Command::ListCollections => CommandType::ListCollections,
            Command::InsertDocument { .. } => CommandType::InsertDocument,
            Command::GetDocument { .. } => CommandType::GetDocument,
            Command::DeleteDocument { .. } => CommandType::DeleteDocument,
            Command::SearchDocuments { .. } => CommandType::SearchDocuments,
            Command::Ping => CommandType::Ping,
        }
    }

    /// The command's string arguments in wire order
    pub fn fields(&self) -> Vec<&str> {
        match self {
            Command::ListTables | Command::ListCollections | Command::Ping => Vec::new(),
            Command::CreateTable { name }
            | Command::DeleteTable { name }
            | Command::CreateCollection { name }
            | Command::DropCollection { name } => vec![name.as_str()],
            Command::ListKeys { table } => vec![table.as_str()],
            Command::Export { path } => vec![path.as_str()],
            Command::Set { table, key, value } => vec![table.as_str(), key.as_str(), value.as_str()],
            Command::Get { table, key } | Command::Delete { table, key } => {
                vec![table.as_str(), key.as_str()]
            }
            Command::InsertDocument {
                collection,
                id,
                data,
            } => vec![collection.as_str(), id.as_str(), data.as_str()],
            Command::GetDocument { collection, id }
            | Command::DeleteDocument { collection, id } => vec![collection.as_str(), id.as_str()],
            Command::SearchDocuments { collection, value } => {
                vec![collection.as_str(), value.as_str()]
            }
        }
    }

    /// Build a command from its type and exactly `field_count()` fields
    pub(crate) fn from_fields(command_type: CommandType, fields: Vec<String>) -> Option<Self> {
        if fields.len() != command_type.field_count() {
            return None;
        }
        let mut fields = fields.into_iter();
        let mut next = || fields.next().unwrap_or_default();

        let command = match command_type {
            CommandType::CreateTable => Command::CreateTable { name: next() },
            CommandType::DeleteTable => Command::DeleteTable { name: next() },
            CommandType::Set => Command::Set {
                table: next(),
                key: next(),
                value: next(),
            },
            CommandType::Get => Command::Get {
                table: next(),
                key: next(),
            },
            CommandType::Delete => Command::Delete {
                table: next(),
                key: next(),
            },
            CommandType::ListTables => Command::ListTables,
            CommandType::ListKeys => Command::ListKeys { table: next() },
            CommandType::Export => Command::Export { path: next() },
            CommandType::CreateCollection => Command::CreateCollection { name: next() },
            CommandType::DropCollection => Command::DropCollection { name: next() },
            CommandType::ListCollections => Command::ListCollections,
            CommandType::InsertDocument => Command::InsertDocument {
                collection: next(),
                id: next(),
                data: next(),
            },
            CommandType::GetDocument => Command::GetDocument {
                collection: next(),
                id: next(),
            },
            CommandType::DeleteDocument => Command::DeleteDocument {
                collection: next(),
                id: next(),
            },
            CommandType::SearchDocuments => Command::SearchDocuments {
                collection: next(),
                value: next(),
            },
            CommandType::Ping => Command::Ping,
        };
        Some(command)
    }

    /// True if the command changes state
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Command::CreateTable { .. }
                | Command::DeleteTable { .. }
                | Command::Set { .. }
                | Command::Delete { .. }
                | Command::CreateCollection { .. }
                | Command::DropCollection { .. }
                | Command::InsertDocument { .. }
                | Command::DeleteDocument { .. }
        )
    }
}

/// A command together with the caller's API key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub api_key: String,
    pub command: Command,
}

impl Request {
    pub fn new(api_key: impl Into<String>, command: Command) -> Self {
        Self {
            api_key: api_key.into(),
            command,
        }
    }
}
