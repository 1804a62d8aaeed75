//! Shareable location identifiers (`#N`) and the history they are pushed to.

use std::sync::LazyLock;

use regex::Regex;

static LEADING_INT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([+-]?\d+)").expect("valid regex"));

/// Location identifier for a zero-based slide index.
pub fn encode(index: usize) -> String {
    format!("#{}", index + 1)
}

/// Zero-based slide index named by a location identifier.
///
/// Accepts `#3`, `3`, ` 3` and `3-intro` alike (the leading integer wins).
/// Anything without a leading integer, or a number below 1, yields `None`.
pub fn decode(location: &str) -> Option<usize> {
    let raw = location.strip_prefix('#').unwrap_or(location);
    let caps = LEADING_INT.captures(raw)?;
    let number: i64 = caps[1].parse().ok()?;
    usize::try_from(number.checked_sub(1)?).ok()
}

/// State attached to a pushed history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub index: usize,
    pub label: String,
}

impl HistoryEntry {
    pub fn for_slide(index: usize) -> Self {
        Self {
            index,
            label: format!("Slide {}", index + 1),
        }
    }
}

/// Delivered when the user moves through history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopState {
    pub state: Option<HistoryEntry>,
    pub location: String,
}

pub trait History {
    /// Current location identifier (may be empty).
    fn location(&self) -> &str;

    fn push(&mut self, entry: HistoryEntry, location: String);

    fn back(&mut self) -> Option<PopState>;

    fn forward(&mut self) -> Option<PopState>;
}

/// Browser-style history kept in memory for the lifetime of a session.
#[derive(Debug, Clone)]
pub struct SessionHistory {
    entries: Vec<PopState>,
    cursor: usize,
}

impl SessionHistory {
    /// The first entry carries no state, like a freshly loaded page.
    pub fn new(initial_location: impl Into<String>) -> Self {
        Self {
            entries: vec![PopState {
                state: None,
                location: initial_location.into(),
            }],
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }
}

impl History for SessionHistory {
    fn location(&self) -> &str {
        &self.entries[self.cursor].location
    }

    fn push(&mut self, entry: HistoryEntry, location: String) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(PopState {
            state: Some(entry),
            location,
        });
        self.cursor = self.entries.len() - 1;
    }

    fn back(&mut self) -> Option<PopState> {
        if !self.can_go_back() {
            return None;
        }
        self.cursor -= 1;
        Some(self.entries[self.cursor].clone())
    }

    fn forward(&mut self) -> Option<PopState> {
        if !self.can_go_forward() {
            return None;
        }
        self.cursor += 1;
        Some(self.entries[self.cursor].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_is_one_based() {
        assert_eq!(encode(0), "#1");
        assert_eq!(encode(11), "#12");
    }

    #[test]
    fn test_decode_round_trips() {
        for i in [0, 1, 7, 42] {
            assert_eq!(decode(&encode(i)), Some(i));
        }
    }

    #[test]
    fn test_decode_tolerates_noise() {
        assert_eq!(decode("3"), Some(2));
        assert_eq!(decode("# 4"), Some(3));
        assert_eq!(decode("#5-intro"), Some(4));
        assert_eq!(decode("#+2"), Some(1));
    }

    #[test]
    fn test_decode_rejects_invalid() {
        assert_eq!(decode(""), None);
        assert_eq!(decode("#"), None);
        assert_eq!(decode("#intro"), None);
        assert_eq!(decode("#0"), None);
        assert_eq!(decode("#-3"), None);
        assert_eq!(decode("#99999999999999999999999"), None);
    }

    #[test]
    fn test_history_back_and_forward() {
        let mut h = SessionHistory::new("");
        h.push(HistoryEntry::for_slide(0), encode(0));
        h.push(HistoryEntry::for_slide(1), encode(1));
        assert_eq!(h.location(), "#2");

        let popped = h.back().unwrap();
        assert_eq!(popped.state, Some(HistoryEntry::for_slide(0)));
        assert_eq!(h.location(), "#1");

        let popped = h.back().unwrap();
        assert_eq!(popped.state, None);
        assert_eq!(popped.location, "");
        assert!(h.back().is_none());

        let popped = h.forward().unwrap();
        assert_eq!(popped.location, "#1");
    }

    #[test]
    fn test_push_discards_forward_entries() {
        let mut h = SessionHistory::new("#1");
        h.push(HistoryEntry::for_slide(1), encode(1));
        h.push(HistoryEntry::for_slide(2), encode(2));
        h.back();
        h.push(HistoryEntry::for_slide(3), encode(3));
        assert_eq!(h.len(), 3);
        assert!(!h.can_go_forward());
        assert_eq!(h.location(), "#4");
    }

    #[test]
    fn test_entry_label() {
        assert_eq!(HistoryEntry::for_slide(4).label, "Slide 5");
    }
}
