//! Ordered, editable key/value rows (query params, headers, form fields)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Projected view of a `KeyValueSet`: deduplicated, trimmed, blank keys removed.
pub type Mapping = BTreeMap<String, String>;

/// Stable identifier of a row within one `KeyValueSet`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowId(u64);

/// A single editable pair
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyValue {
    pub id: RowId,
    pub key: String,
    pub value: String,
}

/// Ordered collection of key/value rows.
///
/// Keys need not be unique while editing. Row order is display order only;
/// it matters for projection solely in that the last duplicate wins.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyValueSet {
    rows: Vec<KeyValue>,
    next_id: u64,
}

impl KeyValueSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set with one row per mapping entry
    pub fn from_mapping(mapping: &Mapping) -> Self {
        let mut set = Self::new();
        for (key, value) in mapping {
            set.push(key.clone(), value.clone());
        }
        set
    }

    /// Append an empty row
    pub fn add(&mut self) -> RowId {
        self.push(String::new(), String::new())
    }

    /// Append a filled row
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) -> RowId {
        let id = RowId(self.next_id);
        self.next_id += 1;
        self.rows.push(KeyValue {
            id,
            key: key.into(),
            value: value.into(),
        });
        id
    }

    /// Delete a row. Unknown ids are ignored.
    pub fn remove(&mut self, id: RowId) -> bool {
        let before = self.rows.len();
        self.rows.retain(|row| row.id != id);
        self.rows.len() != before
    }

    pub fn get(&self, id: RowId) -> Option<&KeyValue> {
        self.rows.iter().find(|row| row.id == id)
    }

    pub fn get_mut(&mut self, id: RowId) -> Option<&mut KeyValue> {
        self.rows.iter_mut().find(|row| row.id == id)
    }

    pub fn set_key(&mut self, id: RowId, key: impl Into<String>) -> bool {
        match self.get_mut(id) {
            Some(row) => {
                row.key = key.into();
                true
            }
            None => false,
        }
    }

    pub fn set_value(&mut self, id: RowId, value: impl Into<String>) -> bool {
        match self.get_mut(id) {
            Some(row) => {
                row.value = value.into();
                true
            }
            None => false,
        }
    }

    pub fn rows(&self) -> &[KeyValue] {
        &self.rows
    }

    /// Id of the row at a display position
    pub fn id_at(&self, index: usize) -> Option<RowId> {
        self.rows.get(index).map(|row| row.id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Collapse rows into a mapping. Last duplicate wins; blank keys are skipped.
    pub fn project(&self) -> Mapping {
        let mut mapping = Mapping::new();
        for row in &self.rows {
            let key = row.key.trim();
            if key.is_empty() {
                continue;
            }
            mapping.insert(key.to_string(), row.value.trim().to_string());
        }
        mapping
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_duplicate_wins() {
        let mut set = KeyValueSet::new();
        set.push("page", "1");
        set.push("limit", "10");
        set.push("page", "2");

        let mapping = set.project();
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping["page"], "2");
        assert_eq!(mapping["limit"], "10");
    }

    #[test]
    fn test_blank_keys_are_dropped_and_values_trimmed() {
        let mut set = KeyValueSet::new();
        set.add();
        set.push("   ", "orphan");
        set.push("  X-Trace ", "  abc  ");

        let mapping = set.project();
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping["X-Trace"], "abc");
    }

    #[test]
    fn test_remove_by_id_keeps_other_rows() {
        let mut set = KeyValueSet::new();
        let first = set.push("a", "1");
        let second = set.push("b", "2");

        assert!(set.remove(first));
        assert!(!set.remove(first));
        assert_eq!(set.len(), 1);
        assert_eq!(set.id_at(0), Some(second));

        // ids are not reused after removal
        let third = set.add();
        assert_ne!(third, first);
    }

    #[test]
    fn test_edit_rows_in_place() {
        let mut set = KeyValueSet::new();
        let id = set.add();
        assert!(set.set_key(id, "q"));
        assert!(set.set_value(id, "rust"));
        assert_eq!(set.project()["q"], "rust");
    }

    #[test]
    fn test_from_mapping_projects_back_to_same_mapping() {
        let mut mapping = Mapping::new();
        mapping.insert("Accept".into(), "application/json".into());
        mapping.insert("X-Id".into(), "7".into());

        let set = KeyValueSet::from_mapping(&mapping);
        assert_eq!(set.len(), 2);
        assert_eq!(set.project(), mapping);
    }
}
