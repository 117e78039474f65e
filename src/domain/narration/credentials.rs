use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Ordered provider API keys plus the rotation cursor shared by every chunk
/// synthesized through this pool.
pub struct CredentialPool {
    keys: Vec<String>,
    cursor: AtomicUsize,
}

impl CredentialPool {
    pub fn new(keys: Vec<String>) -> Self {
        let keys = keys
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        Self {
            keys,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Slot a new chunk should try first.
    pub fn start(&self) -> usize {
        if self.keys.is_empty() {
            return 0;
        }
        self.cursor.load(Ordering::Acquire) % self.keys.len()
    }

    pub fn key(&self, slot: usize) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }
        self.keys.get(slot % self.keys.len()).map(String::as_str)
    }

    /// Moves the shared cursor past `slot` unless another chunk already did.
    /// Later chunks then start from a key that has not just failed.
    pub fn mark_failed(&self, slot: usize) {
        let len = self.keys.len();
        if len == 0 {
            return;
        }
        let slot = slot % len;
        let _ = self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                if current % len == slot {
                    Some((slot + 1) % len)
                } else {
                    None
                }
            });
    }
}

impl fmt::Debug for CredentialPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPool")
            .field("keys", &self.keys.len())
            .field("cursor", &self.cursor.load(Ordering::Relaxed))
            .finish()
    }
}
