//! Raw input decoding and the async input service shared across the runtime.

mod async_service;
pub mod decoder;

pub use async_service::AsyncInputShutdown;
pub use decoder::KeyDecoder;

use async_service::spawn_async_input_task;

use core_events::Event;
use tokio::io::AsyncRead;
use tokio::task::JoinHandle;

/// Spawn the async input service over any byte source.
///
/// Returns the `JoinHandle` for the background task alongside a shutdown handle
/// that can be used to request immediate termination.
pub fn spawn_async_input<R>(
    reader: R,
    sender: tokio::sync::mpsc::Sender<Event>,
) -> (JoinHandle<()>, AsyncInputShutdown)
where
    R: AsyncRead + Send + Unpin + 'static,
{
    spawn_async_input_task(reader, sender)
}
