//! Interactive command client for the arm gateway
//!
//! Reads command words from stdin (one per line) and sends each as a JSON
//! command message, printing the gateway's reply. Stands in for the voice
//! front end, which produces the same tokenized words.

use anyhow::{Context, Result};
use armd::Reply;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

#[derive(Parser)]
#[command(name = "arm-command")]
#[command(about = "Send commands to a running arm gateway")]
#[command(version)]
struct Args {
    /// Gateway host
    #[arg(long, default_value = "127.0.0.1")]
    server: String,

    /// Gateway port
    #[arg(short, long, default_value = "8765")]
    port: u16,

    /// Single command to send instead of reading stdin
    command: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let addr = format!("{}:{}", args.server, args.port);

    let stream = TcpStream::connect(&addr)
        .await
        .with_context(|| format!("Failed to connect to gateway at {}", addr))?;
    let (reader, mut writer) = stream.into_split();
    let mut replies = BufReader::new(reader).lines();

    let welcome = replies
        .next_line()
        .await?
        .context("Gateway closed the connection before the welcome message")?;
    let welcome: Reply = serde_json::from_str(&welcome)
        .context("Gateway sent an unparseable welcome message")?;
    println!("{}", welcome.message.as_deref().unwrap_or("connected"));

    if let Some(command) = args.command {
        send_command(&mut writer, &mut replies, &command).await?;
        return Ok(());
    }

    println!("Enter commands (up/down/left/right/home/open/close), 'quit' to exit:");
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = input.next_line().await? {
        let word = line.trim();
        if word.is_empty() {
            continue;
        }
        if word == "quit" || word == "exit" {
            break;
        }
        send_command(&mut writer, &mut replies, word).await?;
    }

    Ok(())
}

async fn send_command(
    writer: &mut tokio::net::tcp::OwnedWriteHalf,
    replies: &mut tokio::io::Lines<BufReader<tokio::net::tcp::OwnedReadHalf>>,
    action: &str,
) -> Result<()> {
    let payload = serde_json::json!({ "action": action });
    writer.write_all(payload.to_string().as_bytes()).await?;
    writer.write_all(b"\n").await?;

    let reply = replies
        .next_line()
        .await?
        .context("Gateway closed the connection")?;
    let reply: Reply = serde_json::from_str(&reply).context("Unparseable reply from gateway")?;

    if reply.is_ok() {
        println!("ok: {}", reply.response.as_deref().unwrap_or(""));
    } else {
        println!("error: {}", reply.message.as_deref().unwrap_or("unknown error"));
    }
    Ok(())
}
