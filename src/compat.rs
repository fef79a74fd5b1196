//! Diffing between published schema versions

use serde_json::Value;
use similar::{ChangeTag, TextDiff};

/// Summary of the textual difference between two schema documents
#[derive(Debug, Clone)]
pub struct DiffSummary {
    /// Lines present only in the new document
    pub insertions: usize,
    /// Lines present only in the old document
    pub deletions: usize,
    /// Unified diff over the canonical pretty-printed form
    pub unified: String,
}

impl DiffSummary {
    /// Whether the documents are identical in canonical form
    pub fn is_unchanged(&self) -> bool {
        self.insertions == 0 && self.deletions == 0
    }
}

/// Diff two schema documents
///
/// Both documents are pretty-printed before diffing so formatting on disk
/// cannot show up as a change.
pub fn diff_documents(old: &Value, new: &Value) -> DiffSummary {
    let old_text = serde_json::to_string_pretty(old).unwrap_or_default();
    let new_text = serde_json::to_string_pretty(new).unwrap_or_default();

    let diff = TextDiff::from_lines(&old_text, &new_text);

    let mut insertions = 0;
    let mut deletions = 0;
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => insertions += 1,
            ChangeTag::Delete => deletions += 1,
            ChangeTag::Equal => {}
        }
    }

    DiffSummary {
        insertions,
        deletions,
        unified: diff.unified_diff().header("old", "new").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_documents() {
        let doc = serde_json::json!({"title": "Agent", "type": "object"});
        let summary = diff_documents(&doc, &doc);
        assert!(summary.is_unchanged());
    }

    #[test]
    fn test_changed_documents() {
        let old = serde_json::json!({"title": "Agent", "properties": {"name": {"type": "string"}}});
        let new = serde_json::json!({
            "title": "Agent",
            "properties": {
                "name": {"type": "string"},
                "endpoint": {"type": "string"}
            }
        });
        let summary = diff_documents(&old, &new);
        assert!(!summary.is_unchanged());
        assert!(summary.insertions > 0);
        assert!(summary.unified.contains("endpoint"));
    }

    #[test]
    fn test_formatting_is_invisible() {
        let compact: Value = serde_json::from_str(r#"{"title":"Agent"}"#).unwrap();
        let pretty: Value = serde_json::from_str("{\n  \"title\": \"Agent\"\n}").unwrap();
        assert!(diff_documents(&compact, &pretty).is_unchanged());
    }
}
