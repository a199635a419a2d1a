//! linecache: a line-oriented key-value server and its smoke-test client.
//!
//! - `client`: one-shot blocking client (connect, write once, read once)
//! - `server`: tokio server answering one command line per connection
//! - `protocol`: `PING`, `ECHO`, `SET`, `GET`, `DEL` parsing and execution
//! - `storage`: shared in-memory string map
//! - `config`: server CLI and TOML configuration

pub mod client;
pub mod config;
pub mod protocol;
pub mod server;
pub mod storage;
