//! Version rotation — renumber non-canonical images after a build.
//!
//! The daemon has no atomic rename, so each rename is tag-then-remove.
//! A partial failure (tag landed, remove did not, or the reverse) leaves
//! the registry recoverable but inconsistent; the error propagates so the
//! caller sees exactly which command failed.

use crate::compiler::registry::ImageRef;
use crate::docker::{Docker, IMAGE_NAME};
use crate::domain::RuntimeError;

/// A single pending rename, `from` → `to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub from: String,
    pub to: String,
}

/// Compute the renames needed to bring a newest-first set into the
/// `fastled-wasm-compiler-<index>` scheme.
///
/// Index 0 — the canonical image — is never touched. An entry whose
/// repository already matches its target is skipped, which makes the
/// plan (and therefore [`rotate`]) idempotent over its own output.
#[must_use]
pub fn rotation_plan(versions: &[ImageRef]) -> Vec<Rename> {
    versions
        .iter()
        .enumerate()
        .skip(1)
        .filter_map(|(index, version)| {
            let target = format!("{IMAGE_NAME}-{index}");
            if version.repository == target {
                None
            } else {
                Some(Rename {
                    from: version.reference(),
                    to: target,
                })
            }
        })
        .collect()
}

/// Apply the rotation plan for `versions`, returning the rename count.
///
/// # Errors
///
/// Returns the first tag or remove failure; earlier renames are not
/// rolled back.
pub async fn rotate(docker: &impl Docker, versions: &[ImageRef]) -> Result<usize, RuntimeError> {
    let plan = rotation_plan(versions);
    for rename in &plan {
        docker.tag_image(&rename.from, &rename.to).await?;
        docker.remove_image(&rename.from, false).await?;
    }
    Ok(plan.len())
}

/// The sequence as it stands after applying [`rotation_plan`], positions
/// preserved. Entry `i > 0` carries the numbered repository and no tag.
#[must_use]
pub fn rotated(versions: &[ImageRef]) -> Vec<ImageRef> {
    versions
        .iter()
        .enumerate()
        .map(|(index, version)| {
            if index == 0 {
                version.clone()
            } else {
                ImageRef {
                    repository: format!("{IMAGE_NAME}-{index}"),
                    tag: None,
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::test_support::StubDocker;

    fn set(references: &[&str]) -> Vec<ImageRef> {
        references.iter().map(|r| ImageRef::parse(r)).collect()
    }

    #[test]
    fn plan_never_touches_the_canonical_image() {
        let versions = set(&["fastled-wasm-compiler:latest", "v0.2", "v0.1"]);
        let plan = rotation_plan(&versions);
        assert!(plan.iter().all(|r| r.from != "fastled-wasm-compiler:latest"));
        assert_eq!(plan.len(), 2);
    }

    #[test]
    fn plan_skips_entries_already_in_the_numbered_scheme() {
        let versions = set(&[
            "fastled-wasm-compiler:latest",
            "fastled-wasm-compiler-1",
            "v0.1",
        ]);
        let plan = rotation_plan(&versions);
        assert_eq!(
            plan,
            vec![Rename {
                from: "v0.1".to_string(),
                to: "fastled-wasm-compiler-2".to_string(),
            }]
        );
    }

    #[test]
    fn plan_for_empty_or_singleton_set_is_empty() {
        assert!(rotation_plan(&[]).is_empty());
        assert!(rotation_plan(&set(&["fastled-wasm-compiler:latest"])).is_empty());
    }

    #[tokio::test]
    async fn rotate_tags_then_removes_each_stale_entry() {
        let docker = StubDocker::default();
        let versions = set(&["fastled-wasm-compiler:latest", "v0.2:latest"]);
        let renamed = rotate(&docker, &versions).await.expect("rotate");
        assert_eq!(renamed, 1);
        assert_eq!(
            docker.calls(),
            vec![
                "tag v0.2:latest fastled-wasm-compiler-1",
                "rmi v0.2:latest",
            ]
        );
    }

    #[tokio::test]
    async fn rotate_is_idempotent_over_its_own_output() {
        let docker = StubDocker::default();
        let versions = set(&["fastled-wasm-compiler:latest", "v0.2", "v0.1"]);
        rotate(&docker, &versions).await.expect("first pass");
        let renamed = rotate(&docker, &rotated(&versions)).await.expect("second pass");
        assert_eq!(renamed, 0);
    }

    #[tokio::test]
    async fn rotate_surfaces_a_partial_failure() {
        let docker = StubDocker {
            fail_on: vec!["rmi"],
            ..StubDocker::default()
        };
        let versions = set(&["fastled-wasm-compiler:latest", "v0.1"]);
        let err = rotate(&docker, &versions).await.expect_err("expected Err");
        assert!(err.to_string().contains("rmi"), "got: {err}");
        // The tag landed before the failing remove — not rolled back.
        assert_eq!(docker.calls()[0], "tag v0.1 fastled-wasm-compiler-1");
    }
}
