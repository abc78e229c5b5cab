//! Version stamping from `git describe`, shared by `build.rs` and its tests.

/// Turns `git describe --tags --dirty` output into a version that compares
/// equal to its tag.
///
/// Commits past the tag and a dirty tree become build metadata after `+`,
/// which version comparison ignores:
/// `v1.0.2-3-gabc1234-dirty` -> `1.0.2+3.gabc1234.dirty.<timestamp>`.
pub fn describe_to_version(describe: &str, timestamp: u64) -> Option<String> {
    let describe = describe.trim();
    let describe = describe.strip_prefix('v').unwrap_or(describe);

    let (rest, dirty) = match describe.strip_suffix("-dirty") {
        Some(rest) => (rest, true),
        None => (describe, false),
    };

    let mut tag = rest;
    let mut build = Vec::new();
    let parts: Vec<&str> = rest.rsplitn(3, '-').collect();
    if let [sha, commits, prefix] = parts.as_slice() {
        let is_sha = sha.len() > 1
            && sha.starts_with('g')
            && sha[1..].chars().all(|c| c.is_ascii_hexdigit());
        let is_count = !commits.is_empty() && commits.chars().all(|c| c.is_ascii_digit());
        if is_sha && is_count {
            tag = prefix;
            build.push(commits.to_string());
            build.push(sha.to_string());
        }
    }
    if dirty {
        build.push("dirty".to_string());
        build.push(timestamp.to_string());
    }

    if tag.is_empty() {
        None
    } else if build.is_empty() {
        Some(tag.to_string())
    } else {
        Some(format!("{}+{}", tag, build.join(".")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::updater::{compare_versions, is_newer};
    use std::cmp::Ordering;

    #[test]
    fn test_exact_tag() {
        assert_eq!(describe_to_version("v1.0.2", 0).as_deref(), Some("1.0.2"));
        assert_eq!(describe_to_version("1.0.2\n", 0).as_deref(), Some("1.0.2"));
    }

    #[test]
    fn test_commits_past_tag_become_build_metadata() {
        assert_eq!(
            describe_to_version("v1.0.2-3-gabc1234", 0).as_deref(),
            Some("1.0.2+3.gabc1234")
        );
    }

    #[test]
    fn test_dirty_tree_becomes_build_metadata() {
        assert_eq!(
            describe_to_version("v1.0.2-dirty", 1700000000).as_deref(),
            Some("1.0.2+dirty.1700000000")
        );
        assert_eq!(
            describe_to_version("v1.0.2-3-gabc1234-dirty", 42).as_deref(),
            Some("1.0.2+3.gabc1234.dirty.42")
        );
    }

    #[test]
    fn test_pre_release_tag_is_kept() {
        assert_eq!(
            describe_to_version("v1.1.0-rc1", 0).as_deref(),
            Some("1.1.0-rc1")
        );
        assert_eq!(
            describe_to_version("v1.1.0-rc1-2-gdeadbee", 0).as_deref(),
            Some("1.1.0-rc1+2.gdeadbee")
        );
    }

    #[test]
    fn test_empty_describe() {
        assert_eq!(describe_to_version("", 0), None);
        assert_eq!(describe_to_version("v", 0), None);
    }

    #[test]
    fn test_stamped_build_is_not_offered_its_own_release() {
        for describe in ["v1.0.2", "v1.0.2-3-gabc1234", "v1.0.2-dirty", "v1.0.2-3-gabc1234-dirty"] {
            let version = describe_to_version(describe, 1700000000).unwrap();
            assert_eq!(compare_versions(&version, "1.0.2"), Ordering::Equal, "{}", version);
            assert!(!is_newer(&version, "1.0.2"), "{}", version);
            assert!(is_newer(&version, "1.0.3"), "{}", version);
        }
    }
}
