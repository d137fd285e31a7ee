//! Test helpers

use std::{
    io,
    sync::{Arc, Mutex},
};

use tracing::subscriber::DefaultGuard;

/// Captures formatted log output for the current thread.
///
/// Works with `#[tokio::test]`'s current-thread runtime, where spawned tasks
/// run on the test thread and see the thread-local subscriber.
#[derive(Clone, Debug, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Installs a capturing subscriber until the guard is dropped.
    pub fn install() -> (Self, DefaultGuard) {
        let logs = Self::default();
        let writer = logs.clone();

        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let guard = tracing::subscriber::set_default(subscriber);

        (logs, guard)
    }

    /// Captured lines logged at `level` (`"WARN"`, `"DEBUG"`, ...)
    pub fn lines_at(&self, level: &str) -> Vec<String> {
        let buffer = self.0.lock().map(|b| b.clone()).unwrap_or_default();

        String::from_utf8_lossy(&buffer)
            .lines()
            .filter(|line| line.split_whitespace().nth(1) == Some(level))
            .map(str::to_string)
            .collect()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Ok(mut buffer) = self.0.lock() {
            buffer.extend_from_slice(buf);
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
