//! Shared utilities for integration and load testing.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use tcp_balancer::admission::{Unbounded, WorkerPool};
use tcp_balancer::config::AdmissionMode;
use tcp_balancer::load_balancer::{Backend, BackendRegistry, Strategy};
use tcp_balancer::net::{Listener, Relay};

/// Upper bound for any single network step in tests.
pub const STEP_TIMEOUT: Duration = Duration::from_secs(5);

/// Start a backend that echoes every chunk back on the same connection.
#[allow(dead_code)]
pub async fn start_echo_backend() -> SocketAddr {
    start_backend(|data| data.to_vec()).await
}

/// Start a backend that answers every chunk with `reply`.
#[allow(dead_code)]
pub async fn start_fixed_backend(reply: &'static [u8]) -> SocketAddr {
    start_backend(move |_| reply.to_vec()).await
}

/// Start a backend that accepts, reads the request, and closes without replying.
#[allow(dead_code)]
pub async fn start_mute_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
        }
    });
    addr
}

/// Start a programmable backend: each chunk read is answered with `f(chunk)`.
#[allow(dead_code)]
pub async fn start_backend<F>(f: F) -> SocketAddr
where
    F: Fn(&[u8]) -> Vec<u8> + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                loop {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            if socket.write_all(&f(&buf[..n])).await.is_err() {
                                break;
                            }
                        }
                    }
                }
            });
        }
    });
    addr
}

/// An address with nothing listening on it.
#[allow(dead_code)]
pub async fn unreachable_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Build a relay over `backends` with the given strategy.
#[allow(dead_code)]
pub fn relay_for(backends: &[SocketAddr], strategy: Strategy) -> Relay {
    let registry = BackendRegistry::new(
        backends
            .iter()
            .map(|addr| Backend::new(addr.to_string(), addr.to_string()))
            .collect(),
    )
    .unwrap();
    Relay::new(strategy.build(registry))
}

/// Start a balancer on an ephemeral port and return its address.
#[allow(dead_code)]
pub async fn start_balancer(backends: &[SocketAddr], strategy: Strategy, mode: AdmissionMode) -> SocketAddr {
    let relay = relay_for(backends, strategy);
    let listener = Listener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    match mode {
        AdmissionMode::Unbounded => {
            let admission = Unbounded::new(relay);
            tokio::spawn(async move { listener.serve(&admission).await });
        }
        AdmissionMode::WorkerPool => {
            let pool = WorkerPool::spawn(relay, 3, 10);
            tokio::spawn(async move { listener.serve(&pool).await });
        }
    }
    addr
}

/// Write `msg` and return the single reply chunk.
#[allow(dead_code)]
pub async fn round_trip(client: &mut TcpStream, msg: &[u8]) -> Vec<u8> {
    client.write_all(msg).await.unwrap();
    let mut buf = vec![0u8; 2048];
    let n = tokio::time::timeout(STEP_TIMEOUT, client.read(&mut buf))
        .await
        .expect("timed out waiting for reply")
        .unwrap();
    buf.truncate(n);
    buf
}

/// True once the peer has closed the connection (EOF or reset), without data.
#[allow(dead_code)]
pub async fn closed_without_reply(client: &mut TcpStream) -> bool {
    let mut buf = [0u8; 64];
    match tokio::time::timeout(STEP_TIMEOUT, client.read(&mut buf)).await {
        Ok(Ok(0)) | Ok(Err(_)) => true,
        Ok(Ok(_)) | Err(_) => false,
    }
}
