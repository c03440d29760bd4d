use std::collections::VecDeque;

use crate::session::constants::TRANSCRIPT_CAP;

/// Who spoke an utterance fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The local speaker.
    User,
    /// The translation engine.
    Remote,
}

/// One utterance fragment, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub role: Role,
    pub text: String,
}

/// Bounded rolling buffer of recent utterance fragments.
///
/// Appends in arrival order and evicts the oldest entry once the cap is
/// reached.
#[derive(Debug)]
pub struct TranscriptLog {
    entries: VecDeque<TranscriptEntry>,
    cap: usize,
}

impl TranscriptLog {
    #[must_use]
    pub fn new(cap: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(cap),
            cap,
        }
    }

    pub fn push(&mut self, role: Role, text: impl Into<String>) {
        if self.entries.len() == self.cap {
            self.entries.pop_front();
        }
        self.entries.push_back(TranscriptEntry {
            role,
            text: text.into(),
        });
    }

    /// Copies the retained entries, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<TranscriptEntry> {
        self.entries.iter().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TranscriptLog {
    fn default() -> Self {
        Self::new(TRANSCRIPT_CAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_in_arrival_order() {
        let mut log = TranscriptLog::default();
        log.push(Role::User, "hola");
        log.push(Role::Remote, "hello");

        let entries = log.snapshot();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].role, Role::User);
        assert_eq!(entries[0].text, "hola");
        assert_eq!(entries[1].role, Role::Remote);
    }

    #[test]
    fn evicts_oldest_beyond_cap() {
        let mut log = TranscriptLog::default();
        for i in 0..15 {
            log.push(Role::User, format!("line {i}"));
        }

        let entries = log.snapshot();
        assert_eq!(entries.len(), TRANSCRIPT_CAP);
        assert_eq!(entries[0].text, "line 5", "oldest entries evicted first");
        assert_eq!(entries[9].text, "line 14");
    }
}
