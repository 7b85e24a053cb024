//! Ordering over free-form release tags
//!
//! Tags are compared segment-wise after stripping any leading non-numeric
//! marker, so `v1.10.0` sorts above `v1.9.9`:
//! - "v1.2" -> segments [1, 2], no suffix
//! - "release-2.0.1-beta.3" -> segments [2, 0, 1], suffix "beta.3"
//! - "nightly" -> no segments, suffix "nightly"

use std::cmp::Ordering;

use semver::Prerelease;

use crate::repo::types::Release;

/// Returns the version token carried by a tag: the tag with any leading
/// non-digit prefix removed. Tags without any digit are returned unchanged.
pub fn version_token(tag: &str) -> &str {
    match tag.find(|c: char| c.is_ascii_digit()) {
        Some(start) => &tag[start..],
        None => tag,
    }
}

struct ParsedTag<'a> {
    segments: Vec<u64>,
    suffix: &'a str,
}

fn parse_tag(tag: &str) -> ParsedTag<'_> {
    let token = version_token(tag);
    let numeric_end = token
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(token.len());
    let (numeric, suffix) = token.split_at(numeric_end);

    let segments = numeric
        .split('.')
        .filter(|s| !s.is_empty())
        // Overlong segments saturate instead of failing the comparison
        .map(|s| s.parse::<u64>().unwrap_or(u64::MAX))
        .collect();

    ParsedTag {
        segments,
        suffix: suffix.strip_prefix('-').unwrap_or(suffix),
    }
}

fn compare_segments(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            let left = a.get(i).copied().unwrap_or(0);
            let right = b.get(i).copied().unwrap_or(0);
            left.cmp(&right)
        })
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn compare_suffix(a: &str, b: &str) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => Ordering::Equal,
        // A final release outranks any pre-release of the same numbers
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => match (Prerelease::new(a), Prerelease::new(b)) {
            (Ok(left), Ok(right)) => left.cmp(&right),
            _ => a.cmp(b),
        },
    }
}

/// Compare two release tags
///
/// The order is total: `Equal` is returned only for identical strings, so
/// sorting never depends on input order.
pub fn compare_tags(a: &str, b: &str) -> Ordering {
    let left = parse_tag(a);
    let right = parse_tag(b);

    compare_segments(&left.segments, &right.segments)
        .then_with(|| compare_suffix(left.suffix, right.suffix))
        .then_with(|| a.cmp(b))
}

/// Sort releases so the newest tag comes first
pub fn sort_newest_first(releases: &mut [Release]) {
    releases.sort_by(|a, b| compare_tags(&b.tag, &a.tag));
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("v1.0.0", "v1.0.0", Ordering::Equal)]
    #[case("v1.10.0", "v1.9.9", Ordering::Greater)]
    #[case("v2.0.0", "v1.10.0", Ordering::Greater)]
    #[case("v1.9.9", "v1.10.0", Ordering::Less)]
    #[case("v1.2", "v1.2.1", Ordering::Less)] // missing segment is zero
    #[case("1.3", "v1.2.9", Ordering::Greater)] // prefix is optional
    #[case("v1.0.0-beta", "v1.0.0", Ordering::Less)]
    #[case("v1.0.0-beta.2", "v1.0.0-beta.10", Ordering::Less)]
    #[case("v1.0.0-rc1", "v1.0.0-beta", Ordering::Greater)]
    #[case("nightly", "v0.0.1", Ordering::Less)]
    #[case("v99999999999999999999999", "v1.0.0", Ordering::Greater)]
    fn compare_tags_returns_expected(
        #[case] a: &str,
        #[case] b: &str,
        #[case] expected: Ordering,
    ) {
        assert_eq!(compare_tags(a, b), expected);
    }

    #[rstest]
    #[case("v1.2.3", "1.2.3")]
    #[case("release-2.0", "2.0")]
    #[case("1.0.0", "1.0.0")]
    #[case("nightly", "nightly")]
    fn version_token_strips_leading_prefix(#[case] tag: &str, #[case] expected: &str) {
        assert_eq!(version_token(tag), expected);
    }

    #[test]
    fn compare_tags_is_antisymmetric_and_total() {
        let tags = [
            "v1.0.0", "1.0.0", "v1.0", "v1.0.0-beta", "v1.0.0-alpha.1", "v1.9.9", "v1.10.0",
            "nightly", "", "v-", "2", "v2.0.0+build",
        ];

        for a in tags {
            for b in tags {
                let forward = compare_tags(a, b);
                assert_eq!(forward, compare_tags(b, a).reverse(), "{a} vs {b}");
                assert_eq!(forward == Ordering::Equal, a == b, "{a} vs {b}");
            }
        }
    }

    #[test]
    fn sort_newest_first_orders_descending() {
        let mut releases = vec![
            Release::new("v1.9.9", ""),
            Release::new("v2.0.0", ""),
            Release::new("v1.10.0", ""),
            Release::new("v2.0.0-rc1", ""),
        ];

        sort_newest_first(&mut releases);

        let tags: Vec<_> = releases.iter().map(|r| r.tag.as_str()).collect();
        assert_eq!(tags, vec!["v2.0.0", "v2.0.0-rc1", "v1.10.0", "v1.9.9"]);
    }

    #[test]
    fn sort_newest_first_is_idempotent() {
        let mut releases = vec![
            Release::new("v1.0", ""),
            Release::new("v1.0.0", ""),
            Release::new("nightly", ""),
            Release::new("v0.9", ""),
        ];

        sort_newest_first(&mut releases);
        let once = releases.clone();
        sort_newest_first(&mut releases);

        assert_eq!(releases, once);
    }
}
