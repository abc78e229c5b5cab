//! Dotted-numeric version ordering.
//!
//! Release tags are compared component by component as numbers, so
//! `1.0.9 < 1.0.10`. A leading `v` is ignored, missing components count as
//! zero, build metadata after `+` is ignored, and a pre-release suffix after
//! `-` sorts before the plain release (`1.1.0-rc1 < 1.1.0`).

use std::cmp::Ordering;

/// Strips any leading `v` from a tag name (`"v1.2.0"` -> `"1.2.0"`).
pub fn version_from_tag(tag: &str) -> &str {
    tag.trim().trim_start_matches(['v', 'V'])
}

/// Compares two version strings.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let (a_numbers, a_pre) = split_version(a);
    let (b_numbers, b_pre) = split_version(b);

    let len = a_numbers.len().max(b_numbers.len());
    for i in 0..len {
        let x = a_numbers.get(i).copied().unwrap_or(0);
        let y = b_numbers.get(i).copied().unwrap_or(0);
        match x.cmp(&y) {
            Ordering::Equal => continue,
            unequal => return unequal,
        }
    }

    match (a_pre, b_pre) {
        (None, None) => Ordering::Equal,
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (Some(x), Some(y)) => compare_pre_release(x, y),
    }
}

/// True when `candidate` is strictly newer than `current`.
pub fn is_newer(current: &str, candidate: &str) -> bool {
    compare_versions(current, candidate) == Ordering::Less
}

fn split_version(version: &str) -> (Vec<u64>, Option<&str>) {
    let version = version_from_tag(version);
    let version = version.split('+').next().unwrap_or(version);
    let (core, pre) = match version.split_once('-') {
        Some((core, pre)) => (core, Some(pre).filter(|p| !p.is_empty())),
        None => (version, None),
    };

    let numbers = core.split('.').map(leading_number).collect();
    (numbers, pre)
}

/// Numeric prefix of a component; `"3rc1"` yields 3, `"x"` yields 0.
fn leading_number(component: &str) -> u64 {
    let digits: String = component
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Pre-release identifiers compare numerically when both are numbers.
fn compare_pre_release(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ordering = match (x.parse::<u64>(), y.parse::<u64>()) {
                    (Ok(x), Ok(y)) => x.cmp(&y),
                    _ => x.cmp(y),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}
