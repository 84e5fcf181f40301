//! Tracked compiler image versions — parsing and ordering.

use std::cmp::Ordering;
use std::fmt;

use crate::docker::{Docker, IMAGE_NAME};
use crate::domain::RuntimeError;

/// A parsed `repository[:tag]` image reference.
///
/// The daemon prints numbered rotation targets as `fastled-wasm-compiler-N`
/// (implicitly tagged `latest`), so the tag is optional here and omitted
/// when rendering if it was absent in the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub repository: String,
    pub tag: Option<String>,
}

impl ImageRef {
    /// Parse a `repository[:tag]` line from the image listing.
    #[must_use]
    pub fn parse(reference: &str) -> Self {
        match reference.rsplit_once(':') {
            Some((repository, tag)) if !tag.is_empty() => Self {
                repository: repository.to_string(),
                tag: Some(tag.to_string()),
            },
            _ => Self {
                repository: reference.to_string(),
                tag: None,
            },
        }
    }

    /// The full reference as the daemon understands it.
    #[must_use]
    pub fn reference(&self) -> String {
        match &self.tag {
            Some(tag) => format!("{}:{tag}", self.repository),
            None => self.repository.clone(),
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reference())
    }
}

/// Newest-first ordering: descending lexical compare of the full reference.
///
/// The canonical `fastled-wasm-compiler:latest` sorts before every numbered
/// `fastled-wasm-compiler-<n>` reference because `:` orders after `-`, and
/// numbered suffixes sort adjacently. This comparator replaces any reliance
/// on the daemon's listing order.
#[must_use]
pub fn compare_newest_first(a: &ImageRef, b: &ImageRef) -> Ordering {
    b.reference().cmp(&a.reference())
}

/// List all tracked compiler image versions, newest first.
///
/// An empty result is valid and means no image has been built yet.
///
/// # Errors
///
/// Returns an error if the image listing command fails.
pub async fn list_versions(docker: &impl Docker) -> Result<Vec<ImageRef>, RuntimeError> {
    let stdout = docker.list_images(&format!("{IMAGE_NAME}*")).await?;
    let mut versions: Vec<ImageRef> = stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ImageRef::parse)
        .collect();
    versions.sort_by(compare_newest_first);
    versions.dedup_by(|a, b| a.reference() == b.reference());
    Ok(versions)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn reference_strategy() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9-]{0,16}(:[a-z0-9.]{1,8})?"
    }

    proptest! {
        /// Parsing and re-rendering a reference is lossless.
        #[test]
        fn prop_parse_reference_roundtrip(reference in reference_strategy()) {
            prop_assert_eq!(ImageRef::parse(&reference).reference(), reference);
        }

        /// The comparator sorts any set into descending reference order.
        #[test]
        fn prop_sorted_output_is_descending(
            references in prop::collection::vec(reference_strategy(), 0..8)
        ) {
            let mut versions: Vec<ImageRef> =
                references.iter().map(|r| ImageRef::parse(r)).collect();
            versions.sort_by(compare_newest_first);
            for pair in versions.windows(2) {
                prop_assert!(pair[0].reference() >= pair[1].reference());
            }
        }
    }
}
