//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap socket dials, reads and writes with an optional deadline
//! - Surface an expired deadline as an ordinary `io::Error`
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - `None` means wait forever, which is the default for every relay step
//! - Expiry maps to `io::ErrorKind::TimedOut` so callers keep one error path

use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::time;

/// Await `fut`, failing with `ErrorKind::TimedOut` once `deadline` passes.
pub async fn io_deadline<F, T>(deadline: Option<Duration>, fut: F) -> io::Result<T>
where
    F: Future<Output = io::Result<T>>,
{
    match deadline {
        Some(limit) => time::timeout(limit, fut).await?,
        None => fut.await,
    }
}
