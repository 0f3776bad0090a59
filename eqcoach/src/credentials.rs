//! Round-robin credential pools.
//!
//! A pool is an explicit, injectable value (keys + cursor) owned by the
//! orchestrator it is constructed with; there are no module-level
//! singletons. Credential values are immutable once loaded; the cursor is
//! the only mutable state. Across concurrent requests the cursor updates
//! are last-write-wins, which is acceptable because selection only affects
//! load distribution, never correctness.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{CoachError, CoachResult};

#[derive(Debug)]
pub struct CredentialPool {
    provider: String,
    keys: Vec<String>,
    cursor: AtomicUsize,
}

impl CredentialPool {
    pub fn new(provider: impl Into<String>, keys: Vec<String>) -> Self {
        CredentialPool {
            provider: provider.into(),
            keys,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Current cursor position, normalized into range.
    pub fn cursor(&self) -> usize {
        if self.keys.is_empty() {
            return 0;
        }
        self.cursor.load(Ordering::Relaxed) % self.keys.len()
    }

    /// The pool index probed on the given attempt number, relative to the
    /// current cursor. Probing never mutates the cursor.
    pub fn attempt_index(&self, attempt: usize) -> Option<usize> {
        if self.keys.is_empty() {
            return None;
        }
        Some((self.cursor() + attempt) % self.keys.len())
    }

    pub fn credential_at(&self, index: usize) -> &str {
        &self.keys[index]
    }

    /// Hands out the credential at the cursor and advances past it, the
    /// plain round-robin contract for callers without failover needs.
    pub fn next_credential(&self) -> CoachResult<&str> {
        let index = self
            .attempt_index(0)
            .ok_or_else(|| CoachError::NoCredentials(self.provider.clone()))?;
        self.advance_past(index);
        Ok(&self.keys[index])
    }

    /// Moves the cursor to the position after a successful dispatch so the
    /// next unrelated call starts where this one left off.
    pub fn advance_past(&self, index: usize) {
        if !self.keys.is_empty() {
            self.cursor
                .store((index + 1) % self.keys.len(), Ordering::Relaxed);
        }
    }

    /// Pins the cursor, making retry behavior deterministic in tests.
    pub fn set_cursor(&self, index: usize) {
        self.cursor.store(index, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pool(n: usize) -> CredentialPool {
        CredentialPool::new("test", (0..n).map(|i| format!("key-{i}")).collect())
    }

    #[test]
    fn empty_pool_reports_no_credentials() {
        let pool = CredentialPool::new("gemini", Vec::new());
        assert_eq!(
            pool.next_credential(),
            Err(CoachError::NoCredentials("gemini".to_string()))
        );
        assert_eq!(pool.attempt_index(0), None);
    }

    #[test]
    fn round_robin_visits_each_key_once_before_repeating() {
        let pool = pool(3);
        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(pool.next_credential().unwrap().to_string());
        }
        assert_eq!(seen, vec!["key-0", "key-1", "key-2"]);
        assert_eq!(pool.next_credential().unwrap(), "key-0");
    }

    #[test]
    fn probing_attempts_does_not_move_the_cursor() {
        let pool = pool(3);
        pool.set_cursor(1);
        assert_eq!(pool.attempt_index(0), Some(1));
        assert_eq!(pool.attempt_index(1), Some(2));
        assert_eq!(pool.attempt_index(2), Some(0));
        assert_eq!(pool.cursor(), 1);
    }

    #[test]
    fn advance_past_wraps_around() {
        let pool = pool(2);
        pool.advance_past(1);
        assert_eq!(pool.cursor(), 0);
        pool.advance_past(0);
        assert_eq!(pool.cursor(), 1);
    }
}
