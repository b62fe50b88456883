//! Column index resolution from a header row

use std::collections::HashMap;

use crate::core::reshape::ReshapeError;

/// Map from column name to position in a row
#[derive(Debug, Clone, Default)]
pub struct ColumnIndex {
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    /// Resolve every required column against the header
    ///
    /// Fails on the first required name the header lacks. When a header
    /// repeats a name the first occurrence wins.
    pub fn resolve<S: AsRef<str>>(header: &[String], required: &[S]) -> Result<Self, ReshapeError> {
        let mut positions = HashMap::new();

        for name in required {
            let name = name.as_ref();
            if positions.contains_key(name) {
                continue;
            }
            let idx = header
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| ReshapeError::MissingColumn {
                    column: name.to_string(),
                })?;
            positions.insert(name.to_string(), idx);
        }

        Ok(Self { positions })
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_positions() {
        let index = ColumnIndex::resolve(&header(&["Name", "Slot", "Mass"]), &["Mass", "Name"]).unwrap();
        assert_eq!(index.get("Name"), Some(0));
        assert_eq!(index.get("Mass"), Some(2));
        assert_eq!(index.get("Slot"), None);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let err = ColumnIndex::resolve(&header(&["Name"]), &["Name", "Class"]).unwrap_err();
        match err {
            ReshapeError::MissingColumn { column } => assert_eq!(column, "Class"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_first_duplicate_header_wins() {
        let index = ColumnIndex::resolve(&header(&["Name", "Name"]), &["Name"]).unwrap();
        assert_eq!(index.get("Name"), Some(0));
    }
}
