//! Snapshot polling loop
//!
//! One cycle is: list objects -> build tree -> project -> print one JSON
//! line. Cycles never overlap; the interval is measured from the end of one
//! cycle to the start of the next, so a slow bus call pushes the schedule
//! back instead of piling up work.

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use barfeed_config::WifiConfig;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::iwd::{self, IwdBackend, ProjectOptions, SnapshotError, State};

/// Periodic iwd snapshot writer
#[derive(Debug)]
pub struct Poller<B, W> {
    backend: B,
    out: W,
    namespace: String,
    interval: Duration,
    options: ProjectOptions,
}

impl<B, W> Poller<B, W>
where
    B: IwdBackend,
    W: AsyncWrite + Unpin,
{
    pub fn new(backend: B, out: W, config: &WifiConfig) -> Self {
        Self {
            backend,
            out,
            namespace: config.namespace.clone(),
            interval: config.interval,
            options: ProjectOptions {
                include_known_networks: config.known_networks,
            },
        }
    }

    /// Fetch and project the current device states
    pub async fn snapshot(&self) -> Result<Vec<State>, SnapshotError> {
        let objects = self.backend.managed_objects().await?;
        let tree = iwd::build(&objects);
        iwd::project(&tree, &self.namespace, &self.backend, &objects, self.options).await
    }

    /// Take one snapshot and print it; any failure is returned
    pub async fn emit_once(&mut self) -> Result<()> {
        let states = self.snapshot().await.context("Failed to build wifi snapshot")?;
        self.emit(&states).await
    }

    /// Run one polling cycle
    ///
    /// Snapshot failures are logged and swallowed so the next cycle can try
    /// again. Losing the bus connection or stdout ends the poller.
    pub async fn poll_once(&mut self) -> Result<()> {
        let snapshot = self.snapshot().await;
        self.report(snapshot).await
    }

    /// Poll until `shutdown` resolves
    ///
    /// The shutdown future is checked while a snapshot is being fetched and
    /// during every sleep. A snapshot that is already being written is
    /// finished first, so stdout never ends in a partial line.
    pub async fn run<F>(mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        info!(
            interval_ms = self.interval.as_millis() as u64,
            namespace = %self.namespace,
            "Wifi poller started"
        );

        loop {
            let snapshot = tokio::select! {
                biased;
                _ = &mut shutdown => break,
                snapshot = self.snapshot() => snapshot,
            };
            self.report(snapshot).await?;

            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = sleep(self.interval) => {}
            }
        }

        info!("Wifi poller stopped");
        Ok(())
    }

    async fn report(&mut self, snapshot: Result<Vec<State>, SnapshotError>) -> Result<()> {
        match snapshot {
            Ok(states) => {
                debug!(devices = states.len(), "Wifi snapshot ready");
                self.emit(&states).await
            }
            Err(SnapshotError::Source(e)) if e.is_transport() => {
                Err(anyhow::Error::new(e).context("Lost connection to iwd"))
            }
            Err(e) => {
                warn!(error = %e, "Skipping wifi snapshot for this cycle");
                Ok(())
            }
        }
    }

    async fn emit(&mut self, states: &[State]) -> Result<()> {
        let mut line = serde_json::to_string(states).context("Failed to serialize snapshot")?;
        line.push('\n');

        self.out
            .write_all(line.as_bytes())
            .await
            .context("Failed to write snapshot")?;
        self.out.flush().await.context("Failed to flush snapshot")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use crate::iwd::testing::{broken_bus, fixture_objects, FakeBackend, ObjectMap, DEVICE};

    /// Writer that accepts one byte per poll and yields in between
    #[derive(Default)]
    struct TrickleWriter {
        out: Vec<u8>,
        ready: bool,
    }

    impl AsyncWrite for TrickleWriter {
        fn poll_write(
            mut self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            if !self.ready {
                self.ready = true;
                cx.waker().wake_by_ref();
                return Poll::Pending;
            }
            self.ready = false;
            self.out.push(buf[0]);
            Poll::Ready(Ok(1))
        }

        fn poll_flush(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    /// Resolves on its `n + 1`th poll
    struct ReadyAfter(u32);

    impl Future for ReadyAfter {
        type Output = ();

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            if self.0 == 0 {
                return Poll::Ready(());
            }
            self.0 -= 1;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }

    fn config() -> WifiConfig {
        WifiConfig {
            interval: Duration::from_millis(10),
            ..WifiConfig::default()
        }
    }

    fn lines(out: &[u8]) -> Vec<serde_json::Value> {
        String::from_utf8(out.to_vec())
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    fn backend() -> FakeBackend {
        let objects = fixture_objects(Some("/net/connman/iwd/0/4/686f6d65_psk"), true);
        FakeBackend::new(objects).with_ranking(
            DEVICE,
            &[
                ("/net/connman/iwd/0/4/686f6d65_psk", -4500),
                ("/net/connman/iwd/0/4/636166c3a9_open", 6120),
            ],
        )
    }

    #[tokio::test]
    async fn test_poll_once_prints_single_json_line() {
        let mut out = Vec::new();
        let mut poller = Poller::new(backend(), &mut out, &config());

        poller.poll_once().await.unwrap();
        drop(poller);

        let text = String::from_utf8(out.clone()).unwrap();
        assert_eq!(text.matches('\n').count(), 1);
        assert!(text.ends_with('\n'));

        let snapshot = &lines(&out)[0];
        assert_eq!(snapshot[0]["device"], DEVICE);
        assert_eq!(snapshot[0]["connected"]["name"], "home");
        assert_eq!(snapshot[0]["connected"]["strength"], -45.0);
        assert_eq!(snapshot[0]["networks"][0]["name"], "café");
        assert_eq!(snapshot[0]["networks"][0]["strength"], 61.2);
        assert_eq!(snapshot[0]["known_networks"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_failed_cycle_is_skipped_and_next_succeeds() {
        let backend = backend().then_objects(Ok(ObjectMap::new()));
        let mut out = Vec::new();
        let mut poller = Poller::new(backend, &mut out, &config());

        poller.poll_once().await.unwrap();
        poller.poll_once().await.unwrap();
        drop(poller);

        let snapshots = lines(&out);
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0][0]["device"], DEVICE);
    }

    #[tokio::test]
    async fn test_transport_failure_ends_polling() {
        let backend = backend().then_objects(Err(broken_bus()));
        let mut out = Vec::new();
        let mut poller = Poller::new(backend, &mut out, &config());

        let err = poller.poll_once().await.unwrap_err();
        assert!(err.to_string().contains("Lost connection to iwd"));
    }

    #[tokio::test]
    async fn test_emit_once_propagates_snapshot_errors() {
        let backend = backend().then_objects(Ok(ObjectMap::new()));
        let mut out = Vec::new();
        let mut poller = Poller::new(backend, &mut out, &config());

        assert!(poller.emit_once().await.is_err());
        drop(poller);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_run_with_immediate_shutdown_prints_nothing() {
        let mut out = Vec::new();
        let poller = Poller::new(backend(), &mut out, &config());

        poller.run(std::future::ready(())).await.unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_run_polls_until_shutdown() {
        let mut out = Vec::new();
        let poller = Poller::new(backend(), &mut out, &config());

        poller
            .run(sleep(Duration::from_millis(55)))
            .await
            .unwrap();

        let snapshots = lines(&out);
        assert!(!snapshots.is_empty());
        assert!(snapshots.iter().all(|s| s[0]["device"] == DEVICE));
    }

    #[tokio::test]
    async fn test_known_networks_follow_config() {
        let mut objects = fixture_objects(None, true);
        objects.insert(
            "/net/connman/iwd/686f6d65_psk".to_string(),
            crate::iwd::testing::known_network("home", "psk", None),
        );
        let config = WifiConfig {
            known_networks: true,
            ..config()
        };
        let mut out = Vec::new();
        let mut poller = Poller::new(FakeBackend::new(objects), &mut out, &config);

        poller.poll_once().await.unwrap();
        drop(poller);

        let snapshot = &lines(&out)[0];
        assert_eq!(snapshot[0]["known_networks"][0]["name"], "home");
        assert_eq!(snapshot[0]["known_networks"][0]["auto_connect"], true);
        assert!(snapshot[0]["known_networks"][0]["last_connected_time"].is_null());
    }

    #[tokio::test]
    async fn test_shutdown_during_write_finishes_the_line() {
        let mut out = TrickleWriter::default();
        let poller = Poller::new(backend(), &mut out, &config());

        // Pending while the snapshot is fetched, ready once writing starts
        poller.run(ReadyAfter(1)).await.unwrap();

        let text = String::from_utf8(out.out).unwrap();
        assert!(text.ends_with('\n'), "partial line written: {text:?}");
        assert_eq!(lines(text.as_bytes()).len(), 1);
    }
}
