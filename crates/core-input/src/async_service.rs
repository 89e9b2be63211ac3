use crate::decoder::KeyDecoder;
use core_events::{
    ASYNC_INPUT_STARTS, ASYNC_INPUT_STOP_CHANNEL, ASYNC_INPUT_STOP_ERROR, ASYNC_INPUT_STOP_SIGNAL,
    ASYNC_INPUT_STOP_STREAM, CHANNEL_SEND_FAILURES, Event, KeyEvent,
};
use std::io;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::{Notify, mpsc::Sender};
use tokio::task;
use tracing::{Instrument, info, trace, warn};

const READ_CHUNK: usize = 1024;

#[derive(Clone, Debug)]
pub struct AsyncInputShutdown {
    notify: Arc<Notify>,
}

impl AsyncInputShutdown {
    pub fn signal(&self) {
        self.notify.notify_one();
    }
}

#[derive(Clone, Debug)]
struct ShutdownListener {
    notify: Arc<Notify>,
}

impl ShutdownListener {
    fn new_pair() -> (AsyncInputShutdown, Self) {
        let notify = Arc::new(Notify::new());
        (
            AsyncInputShutdown {
                notify: notify.clone(),
            },
            ShutdownListener { notify },
        )
    }

    async fn wait(&self) {
        self.notify.notified().await;
    }
}

/// Spawn a Tokio task that reads raw bytes from `reader`, decodes them and forwards key events.
pub(crate) fn spawn_async_input_task<R>(
    reader: R,
    sender: Sender<Event>,
) -> (task::JoinHandle<()>, AsyncInputShutdown)
where
    R: AsyncRead + Send + Unpin + 'static,
{
    let (shutdown, listener) = ShutdownListener::new_pair();
    let span = tracing::debug_span!(target: "input.thread", "input_async_task");
    let handle = task::spawn(AsyncInputTask::new(sender, reader, listener).run().instrument(span));
    (handle, shutdown)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ExitReason {
    Running,
    ShutdownSignal,
    ChannelClosed,
    StreamEnded,
    StreamError,
}

impl ExitReason {
    fn as_str(&self) -> &'static str {
        match self {
            ExitReason::Running => "running",
            ExitReason::ShutdownSignal => "shutdown_signal",
            ExitReason::ChannelClosed => "channel_closed",
            ExitReason::StreamEnded => "stream_ended",
            ExitReason::StreamError => "stream_error",
        }
    }
}

struct AsyncInputTask<R>
where
    R: AsyncRead + Send + Unpin + 'static,
{
    sender: Sender<Event>,
    reader: R,
    decoder: KeyDecoder,
    shutdown: ShutdownListener,
    exit_reason: ExitReason,
    stream_error: Option<io::ErrorKind>,
}

impl<R> AsyncInputTask<R>
where
    R: AsyncRead + Send + Unpin + 'static,
{
    fn new(sender: Sender<Event>, reader: R, shutdown: ShutdownListener) -> Self {
        Self {
            sender,
            reader,
            decoder: KeyDecoder::new(),
            shutdown,
            exit_reason: ExitReason::Running,
            stream_error: None,
        }
    }

    async fn run(mut self) {
        info!(target: "input.thread", "async_input_task_started");
        ASYNC_INPUT_STARTS.fetch_add(1, Ordering::Relaxed);
        let mut buf = [0u8; READ_CHUNK];
        loop {
            let read = tokio::select! {
                biased;
                _ = self.shutdown.wait() => {
                    self.exit_reason = ExitReason::ShutdownSignal;
                    break;
                }
                read = self.reader.read(&mut buf) => read,
            };

            match read {
                Ok(0) => {
                    self.exit_reason = ExitReason::StreamEnded;
                    let tail = self.decoder.finish();
                    if self.forward(tail).await {
                        self.send_event(Event::Shutdown).await;
                    }
                    break;
                }
                Ok(n) => {
                    trace!(target: "input.thread", bytes = n, "chunk_read");
                    let keys = self.decoder.decode(&buf[..n]);
                    if !self.forward(keys).await {
                        break;
                    }
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    self.exit_reason = ExitReason::StreamError;
                    self.stream_error = Some(err.kind());
                    break;
                }
            }
        }

        let reason = match self.exit_reason {
            ExitReason::Running => ExitReason::StreamEnded,
            other => other,
        };

        match reason {
            ExitReason::ShutdownSignal => {
                ASYNC_INPUT_STOP_SIGNAL.fetch_add(1, Ordering::Relaxed);
            }
            ExitReason::ChannelClosed => {
                ASYNC_INPUT_STOP_CHANNEL.fetch_add(1, Ordering::Relaxed);
            }
            ExitReason::StreamEnded => {
                ASYNC_INPUT_STOP_STREAM.fetch_add(1, Ordering::Relaxed);
            }
            ExitReason::StreamError => {
                ASYNC_INPUT_STOP_ERROR.fetch_add(1, Ordering::Relaxed);
                if let Some(kind) = self.stream_error {
                    warn!(
                        target: "input.thread",
                        error_kind = ?kind,
                        "async_input_task_stream_error"
                    );
                }
                // The session still needs to hear that input is gone.
                self.send_event(Event::Shutdown).await;
            }
            ExitReason::Running => {}
        }

        info!(target: "input.thread", reason = reason.as_str(), "async_input_task_stopped");
    }

    /// Forward decoded keys in order. Returns false once the consumer is gone.
    async fn forward(&mut self, keys: Vec<KeyEvent>) -> bool {
        for key in keys {
            if !self.send_event(Event::Key(key)).await {
                return false;
            }
        }
        true
    }

    async fn send_event(&mut self, event: Event) -> bool {
        match self.sender.send(event).await {
            Ok(()) => true,
            Err(_) => {
                CHANNEL_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
                if !matches!(
                    self.exit_reason,
                    ExitReason::ShutdownSignal | ExitReason::StreamError
                ) {
                    self.exit_reason = ExitReason::ChannelClosed;
                }
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::io::AsyncWriteExt;
    use tokio::sync::{Mutex as TokioMutex, mpsc};
    use tokio::time::{Duration, timeout};
    use tracing::field::{Field, Visit};
    use tracing::{Metadata, Subscriber, subscriber::Interest};
    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
    use tracing_subscriber::registry::Registry;

    static LOG_CAPTURE_GUARD: TokioMutex<()> = TokioMutex::const_new(());

    #[derive(Clone, Default)]
    struct LogCapture {
        events: Arc<Mutex<Vec<CapturedLog>>>,
    }

    #[derive(Clone, Debug)]
    struct CapturedLog {
        target: String,
        fields: Vec<(String, String)>,
    }

    #[derive(Default)]
    struct LogVisitor {
        fields: Vec<(String, String)>,
    }

    impl Visit for LogVisitor {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            self.fields
                .push((field.name().to_string(), format!("{:?}", value)));
        }
    }

    impl<S> Layer<S> for LogCapture
    where
        S: Subscriber,
    {
        fn register_callsite(&self, _metadata: &'static Metadata<'static>) -> Interest {
            Interest::always()
        }

        fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
            metadata.target().starts_with("input.")
        }

        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let mut visitor = LogVisitor::default();
            event.record(&mut visitor);
            self.events.lock().unwrap().push(CapturedLog {
                target: event.metadata().target().to_string(),
                fields: visitor.fields,
            });
        }
    }

    async fn run_scenario(input: &'static [u8]) -> Vec<Event> {
        let (tx, mut rx) = mpsc::channel(64);
        let (_shutdown, listener) = ShutdownListener::new_pair();
        AsyncInputTask::new(tx, input, listener).run().await;

        let mut outputs = Vec::new();
        while let Some(evt) = rx.recv().await {
            outputs.push(evt);
        }
        outputs
    }

    #[tokio::test]
    async fn forwards_decoded_keys_then_shutdown_on_eof() {
        let outputs = run_scenario(b"1 + 2\r").await;
        assert_eq!(
            outputs,
            vec![
                Event::Key(KeyEvent::Character("1 + 2".into())),
                Event::Key(KeyEvent::Enter),
                Event::Shutdown,
            ]
        );
    }

    #[tokio::test]
    async fn pending_escape_flushed_at_eof() {
        let outputs = run_scenario(b"a\x1b").await;
        assert_eq!(
            outputs,
            vec![
                Event::Key(KeyEvent::Character("a".into())),
                Event::Key(KeyEvent::Ignored),
                Event::Shutdown,
            ]
        );
    }

    #[tokio::test]
    async fn escape_sequence_split_across_reads() {
        let (mut writer, reader) = tokio::io::duplex(16);
        let (tx, mut rx) = mpsc::channel(16);
        let (handle, _shutdown) = spawn_async_input_task(reader, tx);

        writer.write_all(b"\x1b[").await.unwrap();
        writer.flush().await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        writer.write_all(b"A").await.unwrap();
        drop(writer);

        let first = timeout(Duration::from_millis(200), rx.recv())
            .await
            .expect("key should arrive");
        assert_eq!(first, Some(Event::Key(KeyEvent::Up)));
        let second = timeout(Duration::from_millis(200), rx.recv())
            .await
            .expect("shutdown should arrive");
        assert_eq!(second, Some(Event::Shutdown));
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_signal_exits_immediately() {
        let (tx, mut rx) = mpsc::channel(1);
        let (writer, reader) = tokio::io::duplex(16);
        let (handle, shutdown) = spawn_async_input_task(reader, tx);

        shutdown.signal();

        timeout(Duration::from_millis(50), handle)
            .await
            .expect("shutdown should resolve promptly")
            .expect("task join failed");
        drop(writer);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn channel_closed_increments_telemetry() {
        let base_channel = ASYNC_INPUT_STOP_CHANNEL.fetch_add(0, Ordering::Relaxed);

        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let (_shutdown, listener) = ShutdownListener::new_pair();
        AsyncInputTask::new(tx, &b"abc"[..], listener).run().await;

        let after_channel = ASYNC_INPUT_STOP_CHANNEL.fetch_add(0, Ordering::Relaxed);
        assert!(
            after_channel > base_channel,
            "channel closed counter did not advance"
        );
    }

    #[tokio::test]
    async fn logs_lifecycle_without_leaking_text() {
        let _log_guard = LOG_CAPTURE_GUARD.lock().await;
        let capture = LogCapture::default();
        let events_handle = capture.events.clone();
        let subscriber = Registry::default().with(capture.with_filter(LevelFilter::TRACE));
        let dispatch = tracing::Dispatch::new(subscriber);
        let _guard = tracing::dispatcher::set_default(&dispatch);

        let outputs = run_scenario(b"hunter2\r").await;
        assert_eq!(outputs.len(), 3);

        let logged = events_handle.lock().unwrap();
        let has_message = |msg: &str| {
            logged.iter().any(|entry| {
                entry.target == "input.thread"
                    && entry
                        .fields
                        .iter()
                        .any(|(k, v)| k == "message" && v == msg)
            })
        };
        assert!(
            has_message("async_input_task_started"),
            "captured: {logged:?}"
        );
        assert!(
            has_message("async_input_task_stopped"),
            "captured: {logged:?}"
        );
        for entry in logged.iter() {
            for (_, value) in &entry.fields {
                assert!(!value.contains("hunter2"), "log leaked typed text: {value}");
            }
        }
    }
}
