use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::record::IncidentRecord;

/// Records queued between the request path and the log task before
/// [`emit`](DiagnosticSink::emit) starts shedding.
const CHANNEL_BUFFER: usize = 1024;

/// How often buffered lines are pushed out to the file while the gate is
/// quiet.
const FLUSH_EVERY: Duration = Duration::from_secs(1);

/// Destination for diagnostic records emitted on detection.
///
/// The gate calls [`emit`](Self::emit) synchronously from whatever thread or
/// task is processing the request, so implementations must not block and
/// must be shareable across requests.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, record: &IncidentRecord);
}

/// Sink that writes the rendered diagnostic string to the `tracing`
/// subscriber at error level.
///
/// This is the default sink: it needs no I/O setup and plays well with
/// whatever logging pipeline the host already runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, record: &IncidentRecord) {
        tracing::error!(
            attempt = record.attempt,
            uri = %record.uri,
            method = %record.method,
            "{}",
            record.render()
        );
    }
}

/// Why the JSON-lines sink could not be brought up, or why a queued record
/// never made it into the file.
///
/// [`Prepare`](Self::Prepare) and [`Open`](Self::Open) happen during
/// [`JsonLinesSink::start`] and abort it; [`Encode`](Self::Encode) and
/// [`Append`](Self::Append) happen inside the log task, where they cost the
/// affected record an error event but keep the task alive.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("could not prepare incident log directory {path}: {source}")]
    Prepare {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not open incident log {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("incident record is not representable as JSON: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("appending to the incident log failed: {0}")]
    Append(std::io::Error),
}

/// A cheap, cloneable handle that queues [`IncidentRecord`] values for a
/// background task appending them to a JSON-lines file.
///
/// `JsonLinesSink` is `Clone + Send + Sync` so it can be shared freely
/// across tasks and request handlers.
#[derive(Clone, Debug)]
pub struct JsonLinesSink {
    tx: mpsc::Sender<IncidentRecord>,
}

impl JsonLinesSink {
    /// Open the log file at `path` (append mode, parent directories created
    /// as needed), spawn the log task, and return the `(sink, join_handle)`
    /// pair.
    ///
    /// Each queued record lands in the file as one newline-terminated JSON
    /// object. Buffered lines are flushed on a short timer and once more
    /// when the last sink clone drops and the queue closes; awaiting the
    /// join handle after that point guarantees the file is complete.
    pub async fn start(path: impl AsRef<Path>) -> Result<(Self, JoinHandle<()>), SinkError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| SinkError::Prepare {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|source| SinkError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER);
        let handle = tokio::spawn(drain(BufWriter::new(file), rx));

        Ok((Self { tx }, handle))
    }
}

impl DiagnosticSink for JsonLinesSink {
    /// Hand the record to the log task without blocking.
    ///
    /// If the queue is full or the log task has exited, the record is
    /// dropped and a warning is logged; diagnostics must never stall the
    /// request path.
    fn emit(&self, record: &IncidentRecord) {
        if let Err(err) = self.tx.try_send(record.clone()) {
            tracing::warn!(
                attempt = record.attempt,
                %err,
                "incident sink unavailable; record dropped"
            );
        }
    }
}

/// Body of the log task: append queued records, flush on a timer while
/// lines are outstanding, and flush one final time when the queue closes.
///
/// A record that fails to encode or append is reported and skipped; the
/// task itself only exits with the queue.
async fn drain(mut file: BufWriter<File>, mut rx: mpsc::Receiver<IncidentRecord>) {
    let mut ticker = interval(FLUSH_EVERY);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut unflushed = 0usize;

    loop {
        tokio::select! {
            queued = rx.recv() => match queued {
                Some(record) => match append_line(&mut file, &record).await {
                    Ok(()) => unflushed += 1,
                    Err(err) => {
                        tracing::error!(attempt = record.attempt, %err, "incident record lost");
                    }
                },
                // Queue closed: every sink handle is gone.
                None => break,
            },
            _ = ticker.tick(), if unflushed > 0 => {
                match file.flush().await {
                    Ok(()) => unflushed = 0,
                    Err(err) => tracing::error!(%err, "incident log flush failed"),
                }
            }
        }
    }

    if unflushed > 0 {
        if let Err(err) = file.flush().await {
            tracing::error!(%err, "final incident log flush failed");
        }
    }
    tracing::debug!("incident log task finished");
}

async fn append_line(file: &mut BufWriter<File>, record: &IncidentRecord) -> Result<(), SinkError> {
    let mut line = serde_json::to_vec(record)?;
    line.push(b'\n');
    file.write_all(&line).await.map_err(SinkError::Append)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn record(attempt: u64) -> IncidentRecord {
        IncidentRecord::new(
            attempt,
            None,
            None,
            None,
            "/app/login",
            "POST",
            HashMap::new(),
            Some("' or 1=1 --".into()),
        )
    }

    #[tokio::test]
    async fn emitted_records_reach_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("incidents.jsonl");

        let (sink, handle) = JsonLinesSink::start(&path).await.unwrap();
        sink.emit(&record(1));
        sink.emit(&record(2));

        // Dropping the sink closes the queue; the task flushes and exits.
        drop(sink);
        handle.await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let attempts: Vec<u64> = contents
            .lines()
            .map(|l| serde_json::from_str::<IncidentRecord>(l).unwrap().attempt)
            .collect();
        assert_eq!(attempts, vec![1, 2]);
    }

    #[tokio::test]
    async fn sink_clones_feed_the_same_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("incidents.jsonl");

        let (sink, handle) = JsonLinesSink::start(&path).await.unwrap();
        let clone = sink.clone();
        sink.emit(&record(1));
        clone.emit(&record(2));

        drop(sink);
        drop(clone);
        handle.await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }

    #[tokio::test]
    async fn missing_log_directories_are_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/logs/incidents.jsonl");

        let (sink, handle) = JsonLinesSink::start(&path).await.unwrap();
        sink.emit(&record(1));
        drop(sink);
        handle.await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 1);
    }

    #[tokio::test]
    async fn unopenable_log_path_is_an_open_error() {
        // A directory cannot be opened for appending.
        let dir = tempfile::tempdir().unwrap();
        let err = JsonLinesSink::start(dir.path()).await.unwrap_err();
        assert!(matches!(err, SinkError::Open { .. }), "got: {err}");
    }

    #[test]
    fn tracing_sink_does_not_panic_without_subscriber() {
        TracingSink.emit(&record(1));
    }
}
