// WHY: source URLs live outside the HTML pages, in a tab-separated listing of the corpus;
// a play missing from the listing still converts, with an empty source URL

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Fields per listing row: file name, source URL, and two descriptive columns
const MIN_FIELDS: usize = 4;

/// File name to source URL mapping
#[derive(Debug, Clone, Default)]
pub struct SourceTable {
    entries: HashMap<String, String>,
}

impl SourceTable {
    /// Parse the listing; rows with fewer than four fields are ignored
    pub fn parse(content: &str) -> Self {
        let mut entries = HashMap::new();
        for row in content.lines() {
            let fields: Vec<&str> = row.split('\t').collect();
            if fields.len() < MIN_FIELDS || fields[..MIN_FIELDS].iter().any(|f| f.is_empty()) {
                debug!("Skipping source row: {:?}", row);
                continue;
            }
            entries.insert(fields[0].to_string(), fields[1].to_string());
        }
        Self { entries }
    }

    /// Load the listing at `path`; a missing file yields an empty table
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("Source table not found: {}", path.display());
            return Ok(Self::default());
        }
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read source table {}", path.display()))?;
        let table = Self::parse(&content);
        info!("Loaded {} sources from {}", table.len(), path.display());
        Ok(table)
    }

    /// Source URL of `file_name`, or an empty string
    pub fn source_for(&self, file_name: &str) -> &str {
        self.entries.get(file_name).map_or("", String::as_str)
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
    use tempfile::TempDir;

    #[test]
    fn test_parse_rows() {
        let table = SourceTable::parse(
            "avare.html\thttp://td.com/avare\tL'Avare\tMolière\n\
             short.html\thttp://td.com/short\n\
             cid.html\thttp://td.com/cid\tLe Cid\tCorneille\textra\n",
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table.source_for("avare.html"), "http://td.com/avare");
        assert_eq!(table.source_for("cid.html"), "http://td.com/cid");
        assert_eq!(table.source_for("short.html"), "");
    }

    #[tokio::test]
    async fn test_missing_table_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let table = SourceTable::load(temp_dir.path().join("absent.tsv")).await.unwrap();
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_load_table() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("plays.tsv");
        std::fs::write(&path, "a.html\thttp://x/a\tA\tB\n").unwrap();
        let table = SourceTable::load(&path).await.unwrap();
        assert_eq!(table.source_for("a.html"), "http://x/a");
    }
}
