use std::collections::BTreeSet;

use glob::Pattern;
use hubsnap_common::error::{HubError, Result};
use hubsnap_common::model::RepoId;
use serde::Deserialize;
use tracing::debug;

use crate::http::HubClient;

#[derive(Debug, Deserialize)]
struct RepoListing {
    siblings: Vec<Sibling>,
}

#[derive(Debug, Deserialize)]
struct Sibling {
    rfilename: String,
}

/// Lists a repository's files, keeping those that match at least one glob.
///
/// With no globs every filename is returned in listing order. Otherwise the result is the
/// de-duplicated union of all matches, in sorted order.
pub async fn list_files<S: AsRef<str>>(
    client: &HubClient,
    repo: &RepoId,
    globs: &[S],
) -> Result<Vec<String>> {
    // Reject bad patterns before touching the network.
    let patterns = compile_globs(globs)?;

    let url = client.repo_api_url(repo)?;
    let response = client.get(url).await?;
    let body = response.bytes().await?;
    let filenames = parse_listing(&body)?;
    debug!("{} lists {} files", repo, filenames.len());

    let selected = select_files(filenames, &patterns);
    debug!(
        "{} files of {} selected by {} pattern(s)",
        selected.len(),
        repo,
        patterns.len()
    );
    Ok(selected)
}

/// Extracts filenames from a repository listing body.
pub fn parse_listing(body: &[u8]) -> Result<Vec<String>> {
    let listing: RepoListing = serde_json::from_slice(body)
        .map_err(|e| HubError::Parse(format!("Unexpected repository listing: {e}")))?;
    Ok(listing
        .siblings
        .into_iter()
        .map(|sibling| sibling.rfilename)
        .collect())
}

pub fn compile_globs<S: AsRef<str>>(globs: &[S]) -> Result<Vec<Pattern>> {
    globs
        .iter()
        .map(|glob| {
            let glob = glob.as_ref();
            Pattern::new(glob).map_err(|e| HubError::InvalidPattern(format!("'{glob}': {e}")))
        })
        .collect()
}

/// Shell-style selection: `*` matches any run (including `/`), `?` one character, `[...]` a
/// class. Matching is case-sensitive.
pub fn select_files(filenames: Vec<String>, patterns: &[Pattern]) -> Vec<String> {
    if patterns.is_empty() {
        return filenames;
    }
    filenames
        .into_iter()
        .filter(|name| patterns.iter().any(|pattern| pattern.matches(name)))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn select(list: &[&str], globs: &[&str]) -> Vec<String> {
        select_files(names(list), &compile_globs(globs).unwrap())
    }

    const LISTING: &[&str] = &[
        ".gitattributes",
        "config.json",
        "tokenizer.json",
        "tokenizer_config.json",
        "pytorch_model.bin",
        "onnx/model.onnx",
        "onnx/config.json",
        "README.md",
    ];

    #[test]
    fn parses_siblings() {
        let body = br#"{"id": "a/b", "siblings": [{"rfilename": "config.json"}, {"rfilename": "onnx/model.onnx", "size": 12}]}"#;
        assert_eq!(
            parse_listing(body).unwrap(),
            names(&["config.json", "onnx/model.onnx"])
        );
    }

    #[test]
    fn malformed_listings_are_parse_errors() {
        let bodies: [&[u8]; 4] = [
            b"not json",
            br#"{"id": "a/b"}"#,
            br#"{"siblings": [{"name": "x"}]}"#,
            br#"[{"rfilename": "x"}]"#,
        ];
        for body in bodies {
            assert!(matches!(parse_listing(body), Err(HubError::Parse(_))));
        }
    }

    #[test]
    fn no_globs_returns_everything() {
        assert_eq!(select(LISTING, &[]), names(LISTING));
    }

    #[test]
    fn globs_are_a_union() {
        let json_and_bin = select(LISTING, &["*.json", "*.bin"]);
        let bin_and_json = select(LISTING, &["*.bin", "*.json"]);
        assert_eq!(json_and_bin, bin_and_json);
        assert_eq!(
            json_and_bin,
            names(&[
                "config.json",
                "onnx/config.json",
                "pytorch_model.bin",
                "tokenizer.json",
                "tokenizer_config.json",
            ])
        );
    }

    #[test]
    fn overlapping_globs_do_not_duplicate() {
        let selected = select(LISTING, &["*.json", "tokenizer*", "*config*"]);
        let unique: BTreeSet<_> = selected.iter().collect();
        assert_eq!(unique.len(), selected.len());
        assert!(selected.contains(&"tokenizer_config.json".to_string()));
    }

    #[test]
    fn wildcards_and_classes() {
        assert_eq!(
            select(LISTING, &["onnx/*"]),
            names(&["onnx/config.json", "onnx/model.onnx"])
        );
        assert_eq!(select(LISTING, &["[Rr]EADME.??"]), names(&["README.md"]));
        // Case-sensitive.
        assert!(select(LISTING, &["readme.md"]).is_empty());
    }

    #[test]
    fn invalid_globs_are_rejected() {
        assert!(matches!(
            compile_globs(&["[unclosed"]),
            Err(HubError::InvalidPattern(_))
        ));
    }
}
