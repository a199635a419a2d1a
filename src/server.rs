//! TCP server for the line command protocol.
//!
//! Each connection carries exactly one request line and one reply; the
//! server closes the connection after writing the reply.

use crate::config::Config;
use crate::protocol;
use crate::storage::Storage;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, trace, warn};

/// Longest request line accepted before the read is cut off
const MAX_LINE_LENGTH: u64 = 64 * 1024;

/// Reply for a request cut off at `MAX_LINE_LENGTH`
const LINE_TOO_LONG: &str = "ERROR: Request line too long";

/// Listen backlog
const BACKLOG: i32 = 1024;

/// Server instance
pub struct Server {
    config: Config,
    storage: Arc<Storage>,
}

impl Server {
    /// Create a new server instance
    pub fn new(config: Config) -> Self {
        Server {
            config,
            storage: Storage::new(),
        }
    }

    /// Bind the configured address
    pub fn bind(&self) -> io::Result<TcpListener> {
        let listener = create_listener(self.config.listen)?;
        TcpListener::from_std(listener)
    }

    /// Bind and serve until the process is stopped
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let listener = self.bind()?;
        self.serve(listener).await?;
        Ok(())
    }

    /// Accept connections on `listener`, one task per connection
    pub async fn serve(&self, listener: TcpListener) -> io::Result<()> {
        info!(address = %listener.local_addr()?, "Server listening");

        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    debug!(peer = %addr, "New connection");

                    let storage = Arc::clone(&self.storage);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, storage).await {
                            debug!(peer = %addr, error = %e, "Connection error");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    /// Get a reference to the storage for testing
    #[cfg(test)]
    pub fn storage(&self) -> &Arc<Storage> {
        &self.storage
    }
}

/// Read one request line, reply, and close.
async fn handle_connection(
    stream: TcpStream,
    storage: Arc<Storage>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader).take(MAX_LINE_LENGTH);
    let mut line = String::new();

    let n = reader.read_line(&mut line).await?;
    if n == 0 {
        trace!("Connection closed by client");
        return Ok(());
    }

    if !line.ends_with('\n') && n as u64 >= MAX_LINE_LENGTH {
        warn!(length = n, "Request line too long");
        writer.write_all(LINE_TOO_LONG.as_bytes()).await?;
        writer.shutdown().await?;
        return Ok(());
    }

    info!(request = line.trim_end(), "Received");

    let response = protocol::respond(&line, &storage);
    trace!(response = %response, "Sending reply");

    writer.write_all(response.as_bytes()).await?;
    writer.shutdown().await?;
    Ok(())
}

/// Create a TCP listener with SO_REUSEADDR so restarts can rebind at once.
fn create_listener(addr: SocketAddr) -> io::Result<std::net::TcpListener> {
    let socket = socket2::Socket::new(
        match addr {
            SocketAddr::V4(_) => socket2::Domain::IPV4,
            SocketAddr::V6(_) => socket2::Domain::IPV6,
        },
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(BACKLOG)?;

    Ok(socket.into())
}
