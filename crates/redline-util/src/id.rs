//! ULID-based identifier generation with prefixes.
//!
//! Identifiers in redline follow the pattern: `prefix_ulid`
//! For example: `snp_01HQXYZ...` for snapshots.

use ulid::Ulid;

/// Known identifier prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdPrefix {
    Document,
    Snapshot,
}

impl IdPrefix {
    /// Get the string prefix for this identifier type.
    pub fn as_str(&self) -> &'static str {
        match self {
            IdPrefix::Document => "doc",
            IdPrefix::Snapshot => "snp",
        }
    }

    /// Parse a prefix from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "doc" => Some(IdPrefix::Document),
            "snp" => Some(IdPrefix::Snapshot),
            _ => None,
        }
    }
}

/// Identifier generation and parsing utilities.
pub struct Identifier;

impl Identifier {
    /// Generate a new ascending identifier (newer = larger).
    ///
    /// Snapshot and document ids both use ascending order so a
    /// lexicographic sort matches chronological order.
    pub fn ascending(prefix: IdPrefix) -> String {
        let ulid = Ulid::new();
        format!("{}_{}", prefix.as_str(), ulid.to_string().to_lowercase())
    }

    /// Generate an identifier with a specific ULID (for testing or imports).
    pub fn with_ulid(prefix: IdPrefix, ulid: Ulid) -> String {
        format!("{}_{}", prefix.as_str(), ulid.to_string().to_lowercase())
    }

    /// Parse an identifier into its prefix and ULID parts.
    pub fn parse(id: &str) -> Option<(IdPrefix, Ulid)> {
        let parts: Vec<&str> = id.splitn(2, '_').collect();
        if parts.len() != 2 {
            return None;
        }

        let prefix = IdPrefix::parse(parts[0])?;
        let ulid = Ulid::from_string(parts[1]).ok()?;
        Some((prefix, ulid))
    }

    /// Check if an identifier has the expected prefix.
    pub fn has_prefix(id: &str, prefix: IdPrefix) -> bool {
        id.starts_with(prefix.as_str()) && id.chars().nth(prefix.as_str().len()) == Some('_')
    }

    /// Generate a document ID.
    pub fn document() -> String {
        Self::ascending(IdPrefix::Document)
    }

    /// Generate a snapshot ID.
    pub fn snapshot() -> String {
        Self::ascending(IdPrefix::Snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascending_id() {
        let id = Identifier::ascending(IdPrefix::Snapshot);
        assert!(id.starts_with("snp_"));
        assert_eq!(id.len(), 30); // "snp_" (4) + ULID (26)
    }

    #[test]
    fn test_ascending_order() {
        let id1 = Identifier::ascending(IdPrefix::Snapshot);
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = Identifier::ascending(IdPrefix::Snapshot);
        assert!(id1 < id2, "Ascending IDs should increase over time");
    }

    #[test]
    fn test_parse_id() {
        let id = Identifier::snapshot();
        let (prefix, _ulid) = Identifier::parse(&id).unwrap();
        assert_eq!(prefix, IdPrefix::Snapshot);
    }

    #[test]
    fn test_has_prefix() {
        let id = Identifier::snapshot();
        assert!(Identifier::has_prefix(&id, IdPrefix::Snapshot));
        assert!(!Identifier::has_prefix(&id, IdPrefix::Document));
    }

    #[test]
    fn test_convenience_functions() {
        assert!(Identifier::document().starts_with("doc_"));
        assert!(Identifier::snapshot().starts_with("snp_"));
    }

    #[test]
    fn test_parse_invalid_format_no_underscore() {
        assert!(Identifier::parse("nounderscore").is_none());
    }

    #[test]
    fn test_parse_invalid_format_unknown_prefix() {
        assert!(Identifier::parse("xyz_01HQXYZ").is_none());
    }

    #[test]
    fn test_parse_invalid_ulid() {
        assert!(Identifier::parse("snp_notaulid").is_none());
    }

    #[test]
    fn test_with_ulid() {
        let ulid = Ulid::new();
        let id = Identifier::with_ulid(IdPrefix::Document, ulid);
        assert!(id.starts_with("doc_"));
        let (_, parsed_ulid) = Identifier::parse(&id).unwrap();
        assert_eq!(parsed_ulid, ulid);
    }

    #[test]
    fn test_has_prefix_without_underscore() {
        // "snp123" starts with "snp" but doesn't have underscore after
        assert!(!Identifier::has_prefix("snp123", IdPrefix::Snapshot));
    }
}
