//! One-shot smoke-test client.
//!
//! Sends a single `\n`-terminated line to the server and returns the first
//! chunk of the reply:
//!
//! ```text
//! connect -> write once -> read once (<= 1024 bytes) -> close -> decode
//! ```
//!
//! Only one read is issued. A reply that arrives in several segments, or one
//! longer than [`RECV_BUFFER_SIZE`], is returned truncated.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::string::FromUtf8Error;
use tracing::debug;

/// Host the client always connects to, resolved to IPv4 only
pub const SERVER_HOST: &str = "localhost";

/// Port the client always connects to
pub const SERVER_PORT: u16 = 8888;

/// Upper bound on the single read of the reply
pub const RECV_BUFFER_SIZE: usize = 1024;

/// Join the words with single spaces and terminate the line.
pub fn build_message<I, S>(words: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut message = String::new();
    for (i, word) in words.into_iter().enumerate() {
        if i > 0 {
            message.push(' ');
        }
        message.push_str(word.as_ref());
    }
    message.push('\n');
    message
}

/// Send `message` to `addr` and return the decoded first reply chunk.
///
/// Blocks without a timeout on connect and read.
pub fn round_trip<A: ToSocketAddrs>(addr: A, message: &str) -> Result<String, ClientError> {
    let mut stream = TcpStream::connect(addr).map_err(ClientError::Connect)?;
    if let Ok(peer) = stream.peer_addr() {
        debug!(peer = %peer, "Connected");
    }

    // Single write; a short count is not retried
    let sent = stream
        .write(message.as_bytes())
        .map_err(ClientError::Send)?;
    debug!(sent, len = message.len(), "Sent request");

    let mut buffer = [0u8; RECV_BUFFER_SIZE];
    let received = stream.read(&mut buffer).map_err(ClientError::Receive)?;
    debug!(received, "Received reply");

    drop(stream);

    String::from_utf8(buffer[..received].to_vec()).map_err(ClientError::Decode)
}

/// First IPv4 address of `localhost:8888`, so exactly one connect is tried.
pub fn server_addr() -> io::Result<SocketAddr> {
    (SERVER_HOST, SERVER_PORT)
        .to_socket_addrs()?
        .find(SocketAddr::is_ipv4)
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("{} has no IPv4 address", SERVER_HOST),
            )
        })
}

/// Build the message from `words` and send it to `localhost:8888`.
pub fn run<I, S>(words: I) -> Result<String, ClientError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let message = build_message(words);
    let addr = server_addr().map_err(ClientError::Connect)?;
    round_trip(addr, &message)
}

/// Client failures. None of them are retried.
#[derive(Debug)]
pub enum ClientError {
    Connect(io::Error),
    Send(io::Error),
    Receive(io::Error),
    Decode(FromUtf8Error),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Connect(e) => write!(f, "Failed to connect: {}", e),
            ClientError::Send(e) => write!(f, "Failed to send request: {}", e),
            ClientError::Receive(e) => write!(f, "Failed to receive reply: {}", e),
            ClientError::Decode(e) => write!(f, "Reply is not valid UTF-8: {}", e),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Connect(e) | ClientError::Send(e) | ClientError::Receive(e) => Some(e),
            ClientError::Decode(e) => Some(e),
        }
    }
}
