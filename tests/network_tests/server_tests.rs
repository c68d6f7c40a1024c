//! Tests for the TCP server and client
//!
//! These tests verify:
//! - End-to-end table and document operations over TCP
//! - API key enforcement on every request
//! - Remote error kinds
//! - Multiple concurrent clients
//! - Graceful shutdown

use std::io::Write;
use std::net::{SocketAddr, TcpStream};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use gemdb::network::{Client, Server};
use gemdb::protocol::{read_response, Command, Status};
use gemdb::{AccessGate, Config, Database, ErrorKind, GemError};
use tempfile::TempDir;

const API_KEY: &str = "test-key";

// =============================================================================
// Helper Functions
// =============================================================================

struct TestServer {
    temp: TempDir,
    server: Arc<Server>,
    addr: SocketAddr,
    thread: Option<JoinHandle<()>>,
}

impl TestServer {
    fn start() -> Self {
        Self::start_with(|builder| builder)
    }

    fn start_with(
        customize: impl FnOnce(gemdb::config::ConfigBuilder) -> gemdb::config::ConfigBuilder,
    ) -> Self {
        let temp = TempDir::new().unwrap();
        let config = customize(
            Config::builder()
                .data_file(temp.path().join("data.json"))
                .listen_addr("127.0.0.1:0"),
        )
        .build();

        let database = Arc::new(Database::open(config.clone()).unwrap());
        let server = Arc::new(Server::bind(config, database, AccessGate::new(API_KEY)).unwrap());
        let addr = server.local_addr();

        let runner = Arc::clone(&server);
        let thread = thread::spawn(move || runner.run().unwrap());

        Self {
            temp,
            server,
            addr,
            thread: Some(thread),
        }
    }

    fn client(&self) -> Client {
        Client::connect(self.addr, API_KEY).unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.server.shutdown();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

// =============================================================================
// Table Operations Tests
// =============================================================================

#[test]
fn test_server_ping() {
    let server = TestServer::start();
    let mut client = server.client();

    client.ping().unwrap();
}

#[test]
fn test_server_table_round_trip() {
    let server = TestServer::start();
    let mut client = server.client();

    client.create_table("users").unwrap();
    client.set("users", "u1", "{\"name\":\"John\"}").unwrap();

    assert_eq!(client.get("users", "u1").unwrap(), "{\"name\":\"John\"}");
    assert_eq!(client.list_tables().unwrap(), vec!["users"]);
    assert_eq!(client.list_keys("users").unwrap(), vec!["u1"]);

    client.delete("users", "u1").unwrap();
    client.delete_table("users").unwrap();
    assert!(client.list_tables().unwrap().is_empty());
}

#[test]
fn test_server_remote_error_kinds() {
    let server = TestServer::start();
    let mut client = server.client();

    let err = client.get("ghost", "k").unwrap_err();
    assert!(matches!(err, GemError::Remote { kind: ErrorKind::NotFound, .. }));

    client.create_table("t").unwrap();
    let err = client.create_table("t").unwrap_err();
    assert!(err.is_already_exists());

    // Connection stays usable after a failed command
    client.ping().unwrap();
}

#[test]
fn test_server_export() {
    let server = TestServer::start();
    let mut client = server.client();

    client.create_table("t").unwrap();
    client.set("t", "k", "v").unwrap();

    let export_path = server.temp.path().join("export.json");
    client.export(export_path.to_str().unwrap()).unwrap();

    let raw = std::fs::read_to_string(&export_path).unwrap();
    assert_eq!(raw, r#"{"t":{"k":"v"}}"#);
}

#[test]
fn test_server_oversized_reply_becomes_error() {
    let server = TestServer::start();
    let mut client = server.client();

    // Fits in a request, but JSON escaping grows the reply past the frame limit
    let value = "\u{1}".repeat(3 * 1024 * 1024);
    client.create_table("t").unwrap();
    client.set("t", "big", &value).unwrap();

    let err = client.get("t", "big").unwrap_err();
    assert!(matches!(err, GemError::Remote { kind: ErrorKind::Internal, .. }));

    // Stream still in sync
    client.ping().unwrap();
    client.set("t", "small", "v").unwrap();
    assert_eq!(client.get("t", "small").unwrap(), "v");
}

// =============================================================================
// Document Operations Tests
// =============================================================================

#[test]
fn test_server_document_round_trip() {
    let server = TestServer::start();
    let mut client = server.client();

    client.create_collection("docs").unwrap();
    client.insert_document("docs", "d1", "hello").unwrap();
    client.insert_document("docs", "d2", "hello").unwrap();

    let document = client.get_document("docs", "d1").unwrap();
    assert_eq!(document.id, "d1");
    assert_eq!(document.data, "hello");
    assert_eq!(client.search_documents("docs", "hello").unwrap(), vec!["d1", "d2"]);

    let err = client.insert_document("docs", "d1", "again").unwrap_err();
    assert!(err.is_already_exists());

    client.delete_document("docs", "d1").unwrap();
    assert!(client.get_document("docs", "d1").unwrap_err().is_not_found());

    assert_eq!(client.list_collections().unwrap(), vec!["docs"]);
    client.drop_collection("docs").unwrap();
    assert!(client.list_collections().unwrap().is_empty());
}

#[test]
fn test_server_document_expires() {
    let server = TestServer::start_with(|b| b.document_ttl(Duration::from_millis(100)));
    let mut client = server.client();

    client.create_collection("short").unwrap();
    client.insert_document("short", "d1", "x").unwrap();

    thread::sleep(Duration::from_millis(400));

    assert!(client.get_document("short", "d1").unwrap_err().is_not_found());
}

// =============================================================================
// Authorization Tests
// =============================================================================

#[test]
fn test_server_rejects_wrong_key() {
    let server = TestServer::start();
    let mut intruder = Client::connect(server.addr, "wrong-key").unwrap();

    let err = intruder.create_table("t").unwrap_err();
    assert!(matches!(err, GemError::Remote { kind: ErrorKind::Unauthorized, .. }));

    // Nothing reached the engine
    let mut client = server.client();
    assert!(client.list_tables().unwrap().is_empty());
}

#[test]
fn test_server_rejects_empty_key() {
    let server = TestServer::start();
    let mut intruder = Client::connect(server.addr, "").unwrap();

    let err = intruder.ping().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
}

#[test]
fn test_server_malformed_frame_gets_bad_request() {
    let server = TestServer::start();
    let mut stream = TcpStream::connect(server.addr).unwrap();

    // Unknown command byte with an empty payload
    stream.write_all(&[0x7f, 0, 0, 0, 0]).unwrap();

    let response = read_response(&mut stream).unwrap();
    assert_eq!(response.status, Status::BadRequest);
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_server_concurrent_clients() {
    let server = TestServer::start();
    server.client().create_table("t").unwrap();

    let addr = server.addr;
    let handles: Vec<_> = (0..4)
        .map(|c| {
            thread::spawn(move || {
                let mut client = Client::connect(addr, API_KEY).unwrap();
                for i in 0..10 {
                    let key = format!("client{}_key{}", c, i);
                    client.set("t", &key, "v").unwrap();
                    assert_eq!(client.get("t", &key).unwrap(), "v");
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(server.client().list_keys("t").unwrap().len(), 40);
}

#[test]
fn test_server_concurrent_duplicate_document() {
    let server = TestServer::start();
    server.client().create_collection("docs").unwrap();

    let addr = server.addr;
    let handles: Vec<_> = (0..4)
        .map(|_| {
            thread::spawn(move || {
                let mut client = Client::connect(addr, API_KEY).unwrap();
                client.insert_document("docs", "same", "x").is_ok()
            })
        })
        .collect();

    let successes = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(successes, 1);
}

#[test]
fn test_server_connection_limit() {
    let server = TestServer::start_with(|b| b.max_connections(1));
    let mut first = server.client();
    first.ping().unwrap();

    // The second connection is answered with an error and closed
    let mut stream = TcpStream::connect(server.addr).unwrap();
    let response = read_response(&mut stream).unwrap();
    assert_eq!(response.status, Status::Error);

    first.ping().unwrap();
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_server_shutdown_flag_stops_accept_loop() {
    let mut server = TestServer::start();

    server.server.shutdown_flag().store(true, Ordering::Relaxed);
    let thread = server.thread.take().unwrap();
    thread.join().unwrap();
}

#[test]
fn test_server_persists_across_restart() {
    let temp = TempDir::new().unwrap();
    let data_file = temp.path().join("data.json");

    let config = Config::builder()
        .data_file(&data_file)
        .listen_addr("127.0.0.1:0")
        .build();

    {
        let database = Arc::new(Database::open(config.clone()).unwrap());
        let server = Arc::new(
            Server::bind(config.clone(), database, AccessGate::new(API_KEY)).unwrap(),
        );
        let runner = Arc::clone(&server);
        let thread = thread::spawn(move || runner.run().unwrap());

        let mut client = Client::connect(server.local_addr(), API_KEY).unwrap();
        client.create_table("t").unwrap();
        client.set("t", "k", "v").unwrap();
        drop(client);

        server.shutdown();
        thread.join().unwrap();
    }

    let database = Database::open(config).unwrap();
    assert_eq!(database.engine().get("t", "k").unwrap(), "v");
    assert!(database.execute(Command::ListCollections).is_ok());
}
