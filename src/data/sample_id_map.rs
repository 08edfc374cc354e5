//! Mapping of sample IDs between two taxa summary tables.

use crate::error::{Result, TaxCompareError};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Maps sample IDs in the first taxa summary to sample IDs in the second.
///
/// Keys are unique; several keys may map to the same target sample.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleIdMap {
    /// Keys in file order.
    keys: Vec<String>,
    map: HashMap<String, String>,
}

impl SampleIdMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from pairs, rejecting duplicate keys.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut result = Self::new();
        for (key, value) in pairs {
            result.insert(key.into(), value.into())?;
        }
        Ok(result)
    }

    /// Load a sample ID map from a TSV file.
    pub fn from_tsv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parse a sample ID map.
    ///
    /// Each non-blank line holds two tab-separated sample IDs: the ID in the
    /// first taxa summary and the ID it maps to in the second.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut result = Self::new();
        for (line_idx, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != 2 {
                return Err(TaxCompareError::SampleIdMap(format!(
                    "line {} must contain exactly two tab-separated sample IDs",
                    line_idx + 1
                )));
            }
            result.insert(fields[0].trim().to_string(), fields[1].trim().to_string())?;
        }
        Ok(result)
    }

    fn insert(&mut self, key: String, value: String) -> Result<()> {
        if self.map.contains_key(&key) {
            return Err(TaxCompareError::SampleIdMap(format!(
                "duplicate sample ID '{}' in the first column of the sample ID map",
                key
            )));
        }
        self.keys.push(key.clone());
        self.map.insert(key, value);
        Ok(())
    }

    /// Target sample ID for a first-table sample ID.
    pub fn get(&self, sample_id: &str) -> Option<&str> {
        self.map.get(sample_id).map(String::as_str)
    }

    /// First-table sample IDs in file order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.keys.iter().map(String::as_str)
    }

    /// Number of mapped sample IDs.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse() {
        let map = SampleIdMap::from_reader(Cursor::new("S1\tT1\n\nS2\tT1\r\nS3\tT2\n")).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map.get("S1"), Some("T1"));
        assert_eq!(map.get("S2"), Some("T1"));
        assert_eq!(map.get("S4"), None);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["S1", "S2", "S3"]);
    }

    #[test]
    fn test_duplicate_key() {
        let result = SampleIdMap::from_reader(Cursor::new("S1\tT1\nS1\tT2\n"));
        assert!(matches!(result, Err(TaxCompareError::SampleIdMap(_))));
    }

    #[test]
    fn test_wrong_field_count() {
        let result = SampleIdMap::from_reader(Cursor::new("S1\tT1\tT2\n"));
        assert!(matches!(result, Err(TaxCompareError::SampleIdMap(_))));
        let result = SampleIdMap::from_reader(Cursor::new("S1\n"));
        assert!(result.is_err());
    }

    #[test]
    fn test_from_pairs() {
        let map = SampleIdMap::from_pairs([("a", "x"), ("b", "x")]).unwrap();
        assert_eq!(map.get("b"), Some("x"));
        assert!(SampleIdMap::from_pairs([("a", "x"), ("a", "y")]).is_err());
        assert!(SampleIdMap::new().is_empty());
    }
}
