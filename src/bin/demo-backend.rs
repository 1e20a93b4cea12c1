//! Demo backend for exercising the balancer.
//!
//! Answers every chunk it reads with a line naming this server and quoting
//! the (trimmed) message, keeping the connection open until the peer closes.

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use tcp_balancer::observability::logging;

#[derive(Parser, Debug)]
#[command(name = "demo-backend")]
#[command(about = "Demo TCP backend that reports which server handled each message", long_about = None)]
struct Cli {
    /// Name reported in every reply.
    #[arg(short, long, default_value = "1")]
    name: String,

    #[arg(short, long, default_value_t = 1236)]
    port: u16,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,
}

fn reply_for(name: &str, data: &[u8]) -> String {
    let message = String::from_utf8_lossy(data);
    format!(
        "Your request handled by server No. {}. It received this: \"{}\"",
        name,
        message.trim()
    )
}

async fn serve_client(mut socket: TcpStream, name: &str) -> std::io::Result<()> {
    let mut buf = [0u8; 1024];
    loop {
        let n = socket.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        tracing::info!(data = %String::from_utf8_lossy(&buf[..n]), "Data received from client");
        socket.write_all(reply_for(name, &buf[..n]).as_bytes()).await?;
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging("info");

    let listener = TcpListener::bind((cli.host.as_str(), cli.port)).await?;
    tracing::info!(name = %cli.name, address = %listener.local_addr()?, "Demo backend listening");

    let name: Arc<str> = cli.name.into();
    loop {
        let (socket, peer) = listener.accept().await?;
        tracing::info!(peer = %peer, "New connection established");

        let name = name.clone();
        tokio::spawn(async move {
            match serve_client(socket, &name).await {
                Ok(()) => tracing::info!(peer = %peer, "Client disconnected"),
                Err(e) => tracing::warn!(peer = %peer, error = %e, "Connection error"),
            }
        });
    }
}
