use std::collections::VecDeque;

use crate::models::HistoryEntry;

const MAX_HISTORY: usize = 50;

/// Bounded log of sent requests, most recent first
#[derive(Debug, Default)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        History {
            entries: VecDeque::with_capacity(MAX_HISTORY),
        }
    }

    /// Add entry to history
    pub fn push(&mut self, entry: HistoryEntry) {
        if self.entries.len() >= MAX_HISTORY {
            self.entries.pop_back();
        }
        self.entries.push_front(entry);
    }

    /// Get history item by index (0 = most recent)
    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::RequestForm;

    fn entry(url: &str) -> HistoryEntry {
        let form = RequestForm {
            url: url.to_string(),
            ..RequestForm::default()
        };
        HistoryEntry {
            request: form.compose().unwrap().descriptor,
            form,
            status_code: Some(200),
            error: None,
            timestamp: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_most_recent_first_and_bounded() {
        let mut history = History::new();
        for i in 0..(MAX_HISTORY + 5) {
            history.push(entry(&format!("https://example.com/{}", i)));
        }
        assert_eq!(history.len(), MAX_HISTORY);
        let newest = history.get(0).unwrap();
        assert_eq!(
            newest.request.url(),
            format!("https://example.com/{}", MAX_HISTORY + 4)
        );
    }
}
