use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard},
};

use tracing::warn;

/// In-memory sink that captured output is written into.
///
/// Clones share the same buffer, so the renderer keeps one handle while a
/// response writer owns another.
#[derive(Debug, Clone, Default)]
pub struct CaptureBuffer {
    inner: Arc<Mutex<String>>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything written so far.
    pub fn contents(&self) -> String {
        self.lock().clone()
    }

    /// Take the buffered text, leaving the buffer empty.
    pub fn take(&self) -> String {
        std::mem::take(&mut *self.lock())
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, String> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!(
                    lock_kind = "mutex",
                    result = "poisoned_recovered",
                    hint = "captured markup may be incomplete after a panic while writing",
                    "Recovered from poisoned capture buffer"
                );
                poisoned.into_inner()
            }
        }
    }
}

impl fmt::Write for CaptureBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.lock().push_str(s);
        Ok(())
    }
}
