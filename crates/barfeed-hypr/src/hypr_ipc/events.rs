//! Hyprland event stream
//!
//! Hyprland pushes one `NAME>>PAYLOAD` line per event on its event socket
//! (`.socket2.sock`). The connection is read-only: nothing is ever written
//! to it, and it stays open until the compositor exits.
//!
//! ## Architecture
//!
//! ```text
//! +-------------+      +---------+      +----------------+
//! | EventStream | ---> | mpsc    | ---> | Consumer loop  |
//! | (reader     |      | channel |      | (`events` CLI) |
//! |  task)      |      +---------+      +----------------+
//! +-------------+
//! ```
//!
//! `EventStream` is usable on its own as an async sequence of records.
//! `EventDispatcher` moves it onto a spawned task so that a consumer can
//! wait on other things (signals, timers) without owning the socket, and
//! so that closing the reader never has to wait for the next event.

use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::net::UnixStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::Stream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::HyprError;
use super::types::EventRecord;

/// Default channel buffer size for event dispatch
///
/// Hyprland emits short bursts (a workspace switch produces several lines
/// at once); a moderate buffer absorbs them without unbounded growth.
pub const DEFAULT_CHANNEL_BUFFER: usize = 64;

/// Sequence of event records read from a line-oriented connection
///
/// The sequence ends at end-of-stream and cannot be restarted; a new
/// connection is needed to read again. A read error also ends it.
///
/// # Example
///
/// ```ignore
/// let mut stream = EventStream::connect(&get_socket_path()?).await?;
/// while let Some(record) = stream.next_record().await? {
///     println!("{} -> {}", record.name, record.payload);
/// }
/// ```
#[derive(Debug)]
pub struct EventStream<R> {
    lines: Lines<R>,
    /// Set after end-of-stream or a read error
    finished: bool,
}

impl EventStream<BufReader<UnixStream>> {
    /// Connect to the event socket at `path`
    ///
    /// # Errors
    ///
    /// Returns `HyprError::ConnectionFailed` if the connection fails.
    pub async fn connect(path: &Path) -> Result<Self, HyprError> {
        let socket = UnixStream::connect(path)
            .await
            .map_err(|source| HyprError::ConnectionFailed {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(path = %path.display(), "Connected to Hyprland event socket");
        Ok(Self::new(BufReader::new(socket)))
    }
}

impl<R> EventStream<R>
where
    R: AsyncBufRead + Unpin,
{
    /// Wrap an already-connected buffered reader
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            finished: false,
        }
    }

    /// Wait for the next complete line and parse it
    ///
    /// Returns `Ok(None)` once the stream has ended. A malformed line is
    /// reported as `HyprError::MalformedEvent` and the following call reads
    /// the next line as usual. `HyprError::ReceiveFailed` is terminal.
    ///
    /// Cancel safe: dropping the returned future loses no buffered input.
    pub async fn next_record(&mut self) -> Result<Option<EventRecord>, HyprError> {
        if self.finished {
            return Ok(None);
        }

        match self.lines.next_line().await {
            Ok(Some(line)) => line.parse().map(Some),
            Ok(None) => {
                self.finished = true;
                Ok(None)
            }
            Err(e) => {
                self.finished = true;
                Err(HyprError::ReceiveFailed(e))
            }
        }
    }
}

impl<R> Stream for EventStream<R>
where
    R: AsyncBufRead + Unpin,
{
    type Item = Result<EventRecord, HyprError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }

        let polled = Pin::new(&mut self.lines).poll_next_line(cx);
        polled.map(|result| match result {
            Ok(Some(line)) => Some(line.parse()),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(HyprError::ReceiveFailed(e)))
            }
        })
    }
}

/// Receiver for records forwarded by the dispatcher
pub type EventReceiver = mpsc::Receiver<EventRecord>;

/// Event dispatcher that decouples socket reading from event handling
///
/// # Example
///
/// ```ignore
/// let (dispatcher, mut rx) = EventDispatcher::new(DEFAULT_CHANNEL_BUFFER);
/// let handle = dispatcher.spawn(EventStream::connect(&path).await?);
///
/// while let Some(record) = rx.recv().await {
///     // handle record
/// }
///
/// handle.join().await?;
/// ```
#[derive(Debug)]
pub struct EventDispatcher {
    sender: mpsc::Sender<EventRecord>,
}

impl EventDispatcher {
    /// Create a dispatcher and the receiver its reader task will feed
    pub fn new(buffer_size: usize) -> (Self, EventReceiver) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        (Self { sender }, receiver)
    }

    /// Move `stream` onto a reader task
    ///
    /// The task forwards every well-formed record until one of:
    /// - the stream ends (`Ok(())`)
    /// - the receiver is dropped (`Ok(())`)
    /// - `EventReaderHandle::close` is called (`Ok(())`)
    /// - a read fails (`Err(HyprError::ReceiveFailed)`)
    ///
    /// Malformed lines are logged and skipped. The stream, and with it the
    /// socket, is dropped when the task returns.
    pub fn spawn<R>(self, stream: EventStream<R>) -> EventReaderHandle
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(self.run_reader_loop(stream, cancel.clone()));

        EventReaderHandle { task, cancel }
    }

    async fn run_reader_loop<R>(
        self,
        mut stream: EventStream<R>,
        cancel: CancellationToken,
    ) -> Result<(), HyprError>
    where
        R: AsyncBufRead + Unpin,
    {
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("Event reader closed");
                    return Ok(());
                }
                next = stream.next_record() => next,
            };

            let record = match next {
                Ok(Some(record)) => record,
                Ok(None) => {
                    info!("Hyprland event stream ended");
                    return Ok(());
                }
                Err(HyprError::MalformedEvent { line }) => {
                    warn!(line = %line, "Skipping malformed Hyprland event");
                    continue;
                }
                Err(e) => {
                    warn!("Hyprland event stream error: {}", e);
                    return Err(e);
                }
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("Event reader closed");
                    return Ok(());
                }
                sent = self.sender.send(record) => {
                    if sent.is_err() {
                        debug!("Event receiver dropped, shutting down event reader");
                        return Ok(());
                    }
                }
            }
        }
    }
}

/// Handle to a spawned event reader task
#[derive(Debug)]
pub struct EventReaderHandle {
    task: JoinHandle<Result<(), HyprError>>,
    cancel: CancellationToken,
}

impl EventReaderHandle {
    /// Ask the reader to stop, even if it is blocked waiting for a line
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Wait for the reader task and return its result
    pub async fn join(self) -> Result<(), HyprError> {
        self.task.await.map_err(HyprError::ReaderTaskFailed)?
    }
}
