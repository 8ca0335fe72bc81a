//! In-memory log sink, shared by the unit and integration tests.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::Layer;
use tracing_subscriber::Registry;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;

use super::JsonLines;

/// Collects JSON lines written by [`JsonLines`].
#[derive(Clone, Default)]
pub struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    /// Installs a capturing subscriber as the thread default until the guard
    /// drops. On a current-thread runtime, spawned tasks log into it too.
    pub fn set_default(&self) -> DefaultGuard {
        let subscriber = tracing_subscriber::registry().with(JsonLines::new(self.clone()));
        tracing::subscriber::set_default(subscriber)
    }

    /// Like [`set_default`](Self::set_default), with `filter` in front of the sink.
    pub fn set_default_with<F>(&self, filter: F) -> DefaultGuard
    where
        F: Layer<Registry> + Send + Sync + 'static,
    {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(JsonLines::new(self.clone()));
        tracing::subscriber::set_default(subscriber)
    }

    /// Every record written so far, in emission order. Lines that are not
    /// JSON are skipped.
    pub fn records(&self) -> Vec<Value> {
        let buf = self.buffer();
        String::from_utf8_lossy(&buf)
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }

    /// Records stamped with correlation id `id`, in emission order.
    pub fn for_request(&self, id: &str) -> Vec<Value> {
        self.records()
            .into_iter()
            .filter(|r| r["correlation_id"] == id)
            .collect()
    }

    fn buffer(&self) -> MutexGuard<'_, Vec<u8>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Captured {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
