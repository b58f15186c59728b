//! Path Pattern Engine (§4.2). Pure, allocation-light: hot-path code
//! during alignment, so `split` borrows rather than copying segments.

use smallvec::SmallVec;

/// A single path segment, borrowed from the original string.
pub type Segment<'a> = &'a str;

/// Most real paths have a handful of segments; inline storage for the
/// first 8 avoids a heap allocation on the hot path.
pub type Segments<'a> = SmallVec<[Segment<'a>; 8]>;

/// Split a path into its segments, stripping a single leading `/`.
/// The root `/` yields the empty sequence (§4.2 `split`).
pub fn split(path: &str) -> Segments<'_> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    if trimmed.is_empty() {
        return SmallVec::new();
    }
    trimmed.split('/').collect()
}

/// True iff `segment` is a parameter token: length >= 2, starts with
/// `{`, ends with `}` (§4.2 `is-parameter`). Does not validate that the
/// token is one of the closed set `{num}`/`{id}`/`{var}` — that
/// validation is the Contract Model's job (§4.1), since an arbitrary
/// `{foo}` is still structurally a parameter for matching purposes.
pub fn is_parameter(segment: &str) -> bool {
    segment.len() >= 2 && segment.starts_with('{') && segment.ends_with('}')
}

/// Specificity: count of literal (non-parameter) segments (§4.2 `specificity`).
pub fn specificity(pattern: &str) -> usize {
    split(pattern).into_iter().filter(|s| !is_parameter(s)).count()
}

/// True iff `request_path` matches `pattern`: equal segment counts, and
/// every pattern segment is either a parameter or equal to the
/// corresponding request segment (§4.2 `matches`).
pub fn matches(request_path: &str, pattern: &str) -> bool {
    let req = split(request_path);
    let pat = split(pattern);
    if req.len() != pat.len() {
        return false;
    }
    req.iter()
        .zip(pat.iter())
        .all(|(r, p)| is_parameter(p) || r == p)
}

/// True iff two patterns conflict: equal segment counts and no pair of
/// corresponding segments consists of two unequal literals — i.e. some
/// concrete path could match both (§4.2 `conflict`).
///
/// `conflict(p, p)` is always true (reflexive) and the relation is
/// symmetric, both exercised in `tests/pattern_test.rs` (§8 invariant 1).
pub fn conflict(p1: &str, p2: &str) -> bool {
    let s1 = split(p1);
    let s2 = split(p2);
    if s1.len() != s2.len() {
        return false;
    }
    s1.iter().zip(s2.iter()).all(|(a, b)| {
        if is_parameter(a) || is_parameter(b) {
            true
        } else {
            a == b
        }
    })
}
