//! Public-facing ingress server
//!
//! Terminates long-lived client connections, validates inbound command
//! messages, forwards each one to the controller's relay listener, and
//! returns a per-message reply. The protocol is newline-delimited JSON in
//! both directions.
//!
//! Each forwarded command opens a fresh connection to the relay. That is a
//! deliberate simplicity trade-off inherited from the original system: a
//! pooled connection would cut latency and churn, but per-command
//! connections keep forwarding stateless and failure handling trivial.

use crate::command::Reply;
use crate::relay::RELAY_READ_LIMIT;
use crate::{ArmError, Result};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Shared server state passed into every connection handler.
///
/// Owns the active-client set and the downstream relay address; no
/// ambient globals.
pub struct GatewayContext {
    robot_addr: String,
    clients: Mutex<HashMap<SocketAddr, Instant>>,
}

impl GatewayContext {
    pub fn new(robot_addr: String) -> Self {
        Self {
            robot_addr,
            clients: Mutex::new(HashMap::new()),
        }
    }

    pub fn robot_addr(&self) -> &str {
        &self.robot_addr
    }

    pub async fn client_count(&self) -> usize {
        self.clients.lock().await.len()
    }
}

/// Accepts client connections and serves each on its own task.
pub struct IngressServer {
    listener: TcpListener,
    context: Arc<GatewayContext>,
}

impl IngressServer {
    /// Bind the public transport. A bind failure (port already in use)
    /// is fatal and propagates to the caller.
    pub async fn bind(addr: &str, robot_addr: String) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!("Gateway listening on {}", addr);
        Ok(Self {
            listener,
            context: Arc::new(GatewayContext::new(robot_addr)),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn context(&self) -> Arc<GatewayContext> {
        Arc::clone(&self.context)
    }

    /// Accept loop; never terminates on per-connection errors.
    pub async fn run(self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    let context = Arc::clone(&self.context);
                    tokio::spawn(async move {
                        context.clients.lock().await.insert(peer, Instant::now());
                        info!("New client connected: {}", peer);

                        if let Err(e) = handle_client(stream, peer, &context).await {
                            info!("Client disconnected: {} ({})", peer, e);
                        } else {
                            info!("Client disconnected: {}", peer);
                        }

                        context.clients.lock().await.remove(&peer);
                    });
                }
                Err(e) => {
                    error!("Error accepting client connection: {}", e);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }
}

/// Serve one client session until it disconnects.
///
/// Replies are strictly ordered with requests on this connection: each
/// inbound line is answered before the next is read.
async fn handle_client(
    stream: TcpStream,
    peer: SocketAddr,
    context: &GatewayContext,
) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    send_reply(&mut writer, &Reply::welcome()).await?;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        debug!("Received from {}: {}", peer, line);

        let reply = match serde_json::from_str::<serde_json::Value>(&line) {
            Err(_) => {
                warn!("Invalid JSON received from {}", peer);
                Reply::error("Invalid JSON")
            }
            Ok(message) => {
                if message.get("action").is_some() {
                    match forward_to_robot(context.robot_addr(), &message).await {
                        Ok(ack) => Reply::ok_response(ack),
                        Err(e) => {
                            error!("Error sending command to robot: {}", e);
                            Reply::error(format!("Failed to reach robot controller: {}", e))
                        }
                    }
                } else {
                    Reply::error("Invalid command format")
                }
            }
        };

        send_reply(&mut writer, &reply).await?;
    }

    Ok(())
}

async fn send_reply(writer: &mut OwnedWriteHalf, reply: &Reply) -> Result<()> {
    let mut payload = serde_json::to_vec(reply)?;
    payload.push(b'\n');
    writer.write_all(&payload).await?;
    Ok(())
}

/// Forward one command over a fresh relay connection and return the
/// acknowledgement text.
///
/// No timeout is applied: a stalled relay blocks only the requesting
/// client's session.
pub async fn forward_to_robot(robot_addr: &str, command: &serde_json::Value) -> Result<String> {
    let mut stream = TcpStream::connect(robot_addr).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::ConnectionRefused {
            ArmError::Connection(
                "Connection refused. Is the robot controller running?".to_string(),
            )
        } else {
            ArmError::Connection(format!("{}: {}", robot_addr, e))
        }
    })?;

    stream.write_all(&serde_json::to_vec(command)?).await?;

    let mut buffer = [0u8; RELAY_READ_LIMIT];
    let n = stream.read(&mut buffer).await?;
    let ack = String::from_utf8_lossy(&buffer[..n]).into_owned();
    debug!("Robot response: {}", ack);
    Ok(ack)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Action;
    use crate::queue::{command_queue, QueueConsumer};
    use crate::relay::RelayListener;
    use tokio::io::Lines;
    use tokio::net::tcp::OwnedReadHalf;

    struct TestClient {
        lines: Lines<BufReader<OwnedReadHalf>>,
        writer: OwnedWriteHalf,
    }

    impl TestClient {
        async fn connect(addr: SocketAddr) -> Self {
            let stream = TcpStream::connect(addr).await.unwrap();
            let (reader, writer) = stream.into_split();
            Self {
                lines: BufReader::new(reader).lines(),
                writer,
            }
        }

        async fn send(&mut self, payload: &str) {
            self.writer.write_all(payload.as_bytes()).await.unwrap();
            self.writer.write_all(b"\n").await.unwrap();
        }

        async fn recv(&mut self) -> Reply {
            let line = self.lines.next_line().await.unwrap().unwrap();
            serde_json::from_str(&line).unwrap()
        }
    }

    /// Relay listener plus gateway wired together, as deployed.
    async fn spawn_stack() -> (SocketAddr, QueueConsumer) {
        let (producer, consumer) = command_queue();
        let relay = RelayListener::bind("127.0.0.1:0", producer).await.unwrap();
        let robot_addr = relay.local_addr().unwrap();
        tokio::spawn(relay.run());

        let server = IngressServer::bind("127.0.0.1:0", robot_addr.to_string())
            .await
            .unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(server.run());
        (addr, consumer)
    }

    #[tokio::test]
    async fn welcome_is_sent_on_connect() {
        let server = IngressServer::bind("127.0.0.1:0", "127.0.0.1:1".to_string())
            .await
            .unwrap();
        let addr = server.local_addr().unwrap();
        let context = server.context();
        tokio::spawn(server.run());

        let mut client = TestClient::connect(addr).await;
        let welcome = client.recv().await;
        assert!(welcome.is_ok());
        assert_eq!(welcome.message.as_deref(), Some("Connected to robot server"));
        // The client is registered before the welcome goes out.
        assert_eq!(context.client_count().await, 1);
    }

    #[tokio::test]
    async fn valid_command_is_forwarded_and_acknowledged() {
        let (addr, mut consumer) = spawn_stack().await;
        let mut client = TestClient::connect(addr).await;
        client.recv().await; // welcome

        client.send(r#"{"action": "left"}"#).await;
        let reply = client.recv().await;
        assert!(reply.is_ok());
        assert_eq!(reply.response.as_deref(), Some("Command received"));
        assert_eq!(consumer.pop().unwrap().action, Action::Left);
    }

    #[tokio::test]
    async fn malformed_input_keeps_the_connection_usable() {
        let (addr, mut consumer) = spawn_stack().await;
        let mut client = TestClient::connect(addr).await;
        client.recv().await;

        client.send("this is not json").await;
        let reply = client.recv().await;
        assert_eq!(reply.status, "error");
        assert_eq!(reply.message.as_deref(), Some("Invalid JSON"));

        client.send(r#"{"action": "up"}"#).await;
        let reply = client.recv().await;
        assert!(reply.is_ok());
        assert_eq!(consumer.pop().unwrap().action, Action::Up);
    }

    #[tokio::test]
    async fn missing_action_field_is_an_error() {
        let (addr, mut consumer) = spawn_stack().await;
        let mut client = TestClient::connect(addr).await;
        client.recv().await;

        client.send(r#"{"verb": "left"}"#).await;
        let reply = client.recv().await;
        assert_eq!(reply.status, "error");
        assert_eq!(reply.message.as_deref(), Some("Invalid command format"));
        assert!(consumer.pop().is_none());
    }

    #[tokio::test]
    async fn unreachable_relay_is_reported_without_dropping_the_client() {
        // Reserve a port, then free it so connects are refused.
        let unused = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let robot_addr = unused.local_addr().unwrap();
        drop(unused);

        let server = IngressServer::bind("127.0.0.1:0", robot_addr.to_string())
            .await
            .unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(server.run());

        let mut client = TestClient::connect(addr).await;
        client.recv().await;

        client.send(r#"{"action": "left"}"#).await;
        let reply = client.recv().await;
        assert_eq!(reply.status, "error");
        assert!(reply.message.unwrap().contains("robot controller"));

        // The same connection still serves subsequent requests.
        client.send(r#"{"action": "home"}"#).await;
        let reply = client.recv().await;
        assert_eq!(reply.status, "error");
    }
}
