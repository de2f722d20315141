//! Relay listener for the controller-side transport
//!
//! Accepts one command per connection from the gateway's forwarding hop.
//! The payload is raw JSON bytes read in a single bounded read; anything
//! past the read limit truncates. The acknowledgement is a fixed literal
//! byte string, not JSON.

use crate::command::Command;
use crate::queue::QueueProducer;
use crate::Result;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info, warn};

/// Maximum bytes read from a relay connection. Larger payloads truncate
/// silently; behavior beyond this size is undefined upstream.
pub const RELAY_READ_LIMIT: usize = 1024;

/// Fixed acknowledgement literal for an accepted command.
pub const ACK_RECEIVED: &[u8] = b"Command received";

/// Fixed error literal for an undecodable payload.
pub const ACK_INVALID: &[u8] = b"Error: Invalid JSON data";

/// Listener feeding parsed commands into the command queue.
pub struct RelayListener {
    listener: TcpListener,
    queue: QueueProducer,
}

impl RelayListener {
    /// Bind the relay transport. A bind failure is fatal to the process
    /// and is propagated to the caller.
    pub async fn bind(addr: &str, queue: QueueProducer) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!("Command server listening on {}", addr);
        Ok(Self { listener, queue })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept loop. Faults are logged and the loop restarts after a short
    /// delay; it never terminates the process.
    pub async fn run(self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    if let Err(e) = handle_connection(stream, peer, &self.queue).await {
                        warn!("Relay connection from {} failed: {}", peer, e);
                    }
                }
                Err(e) => {
                    error!("Error in command server accept loop: {}", e);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }
}

/// Read one command, enqueue it, acknowledge, close.
async fn handle_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    queue: &QueueProducer,
) -> Result<()> {
    info!("Connected by {}", peer);

    let mut buffer = [0u8; RELAY_READ_LIMIT];
    let n = stream.read(&mut buffer).await?;
    if n == 0 {
        return Ok(());
    }

    match serde_json::from_slice::<Command>(&buffer[..n]) {
        Ok(command) => {
            queue.push(command)?;
            stream.write_all(ACK_RECEIVED).await?;
        }
        Err(e) => {
            warn!("Invalid JSON data received from {}: {}", peer, e);
            stream.write_all(ACK_INVALID).await?;
        }
    }

    stream.shutdown().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Action;
    use crate::queue::command_queue;
    use tokio::io::AsyncReadExt;

    async fn spawn_listener() -> (SocketAddr, crate::queue::QueueConsumer) {
        let (producer, consumer) = command_queue();
        let listener = RelayListener::bind("127.0.0.1:0", producer).await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(listener.run());
        (addr, consumer)
    }

    async fn send_raw(addr: SocketAddr, payload: &[u8]) -> Vec<u8> {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(payload).await.unwrap();
        let mut ack = Vec::new();
        stream.read_to_end(&mut ack).await.unwrap();
        ack
    }

    #[tokio::test]
    async fn valid_command_is_acknowledged_and_enqueued() {
        let (addr, mut consumer) = spawn_listener().await;
        let ack = send_raw(addr, br#"{"action": "left"}"#).await;
        assert_eq!(ack, ACK_RECEIVED);
        assert_eq!(consumer.pop().unwrap().action, Action::Left);
    }

    #[tokio::test]
    async fn malformed_payload_gets_error_literal_and_loop_survives() {
        let (addr, mut consumer) = spawn_listener().await;
        let ack = send_raw(addr, b"not json at all").await;
        assert_eq!(ack, ACK_INVALID);
        assert!(consumer.pop().is_none());

        // The listener keeps accepting after a bad payload.
        let ack = send_raw(addr, br#"{"action": "home"}"#).await;
        assert_eq!(ack, ACK_RECEIVED);
        assert_eq!(consumer.pop().unwrap().action, Action::Home);
    }

    #[tokio::test]
    async fn truncated_payload_is_rejected() {
        let (addr, mut consumer) = spawn_listener().await;
        // A command whose JSON would only close past the read limit is seen
        // as an undecodable prefix. The payload fills the read buffer exactly.
        let mut payload = Vec::from(&br#"{"action": ""#[..]);
        payload.resize(RELAY_READ_LIMIT, b'x');
        let ack = send_raw(addr, &payload).await;
        assert_eq!(ack, ACK_INVALID);
        assert!(consumer.pop().is_none());
    }

    #[tokio::test]
    async fn commands_arrive_in_connection_order() {
        let (addr, mut consumer) = spawn_listener().await;
        for action in ["up", "down", "close"] {
            let payload = format!(r#"{{"action": "{}"}}"#, action);
            let ack = send_raw(addr, payload.as_bytes()).await;
            assert_eq!(ack, ACK_RECEIVED);
        }
        assert_eq!(consumer.pop().unwrap().action, Action::Up);
        assert_eq!(consumer.pop().unwrap().action, Action::Down);
        assert_eq!(consumer.pop().unwrap().action, Action::Close);
    }
}
