//! Retention — drop the oldest tracked version past the limit.

use crate::compiler::registry::ImageRef;
use crate::docker::Docker;
use crate::domain::RuntimeError;

/// Compiler image versions retained after a build cycle.
pub const KEEP_IMAGES: usize = 5;

/// The entry [`evict`] would remove: the last (oldest) one, and only when
/// the set exceeds `limit`.
#[must_use]
pub fn eviction_candidate(versions: &[ImageRef], limit: usize) -> Option<&ImageRef> {
    if versions.len() > limit {
        versions.last()
    } else {
        None
    }
}

/// Remove the single oldest version when the set exceeds `limit`.
///
/// Called once per build cycle rather than in a loop, so retention can
/// transiently exceed the limit by one build until the next cycle.
///
/// # Errors
///
/// Returns an error if the image removal command fails.
pub async fn evict(
    docker: &impl Docker,
    versions: &[ImageRef],
    limit: usize,
) -> Result<Option<ImageRef>, RuntimeError> {
    match eviction_candidate(versions, limit) {
        Some(oldest) => {
            docker.remove_image(&oldest.reference(), false).await?;
            Ok(Some(oldest.clone()))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::test_support::StubDocker;

    fn set(len: usize) -> Vec<ImageRef> {
        let mut versions = vec![ImageRef::parse("fastled-wasm-compiler:latest")];
        for index in 1..len {
            versions.push(ImageRef::parse(&format!("fastled-wasm-compiler-{index}")));
        }
        versions
    }

    #[tokio::test]
    async fn evict_removes_exactly_the_oldest_entry_when_over_limit() {
        let docker = StubDocker::default();
        let versions = set(6);
        let removed = evict(&docker, &versions, KEEP_IMAGES)
            .await
            .expect("evict")
            .expect("one eviction");
        assert_eq!(removed.reference(), "fastled-wasm-compiler-5");
        assert_eq!(docker.calls(), vec!["rmi fastled-wasm-compiler-5"]);
    }

    #[tokio::test]
    async fn evict_is_a_noop_at_or_under_the_limit() {
        let docker = StubDocker::default();
        assert!(
            evict(&docker, &set(5), KEEP_IMAGES)
                .await
                .expect("evict")
                .is_none()
        );
        assert!(docker.calls().is_empty());
    }

    #[test]
    fn eviction_candidate_always_drops_size_by_exactly_one() {
        for len in 6..10 {
            let versions = set(len);
            let candidate = eviction_candidate(&versions, KEEP_IMAGES).expect("candidate");
            let remaining = versions
                .iter()
                .filter(|v| v.reference() != candidate.reference())
                .count();
            assert_eq!(remaining, len - 1);
        }
    }

    #[test]
    fn eviction_candidate_empty_set_is_none() {
        assert!(eviction_candidate(&[], KEEP_IMAGES).is_none());
    }
}
