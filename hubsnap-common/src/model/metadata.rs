use serde::{Deserialize, Serialize};

/// Facts about one remote file, as reported by a header-only request. Produced on demand
/// and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Commit the `main` revision resolved to (`X-Repo-Commit`).
    pub commit_hash: Option<String>,
    /// Normalised ETag: no weak-validator prefix and no surrounding quotes.
    pub etag: Option<String>,
    /// Where the file content actually lives: the redirect target when the hub points at
    /// storage, otherwise the requested URL.
    pub location: String,
    pub size: Option<u64>,
}

/// Strips a leading `W/` weak-validator marker and the quote characters around an ETag.
pub fn normalize_etag(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix("W/").unwrap_or(trimmed);
    trimmed.trim_matches('"').to_string()
}

#[cfg(test)]
mod tests {
    use super::normalize_etag;

    #[test]
    fn strips_weak_prefix_and_quotes() {
        assert_eq!(normalize_etag("W/\"abc123\""), "abc123");
        assert_eq!(normalize_etag("\"abc123\""), "abc123");
        assert_eq!(normalize_etag("abc123"), "abc123");
        assert_eq!(
            normalize_etag(" \"sha256-e4b0c442\" "),
            "sha256-e4b0c442"
        );
    }
}
