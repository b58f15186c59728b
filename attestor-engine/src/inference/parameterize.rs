//! Phase 2: per-path parameterization decision and parameter naming (§4.4).

use rustc_hash::FxHashMap;

use super::segment_stats::PositionStats;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentDecision {
    Literal,
    Parameter(&'static str),
}

/// Decide whether the segment at `(segment_count, index)` should be
/// parameterized, and if so with which token (§4.4 phase 2).
///
/// A segment is parameterized iff either (a) its position is saturated
/// and its total >= `min_sample_size`, or (b) its unique/total ratio >=
/// `threshold` and total >= `min_sample_size`.
pub fn decide_segment(position: &PositionStats, threshold: f64, min_sample_size: u64) -> SegmentDecision {
    if position.total < min_sample_size {
        return SegmentDecision::Literal;
    }

    if position.is_saturated() {
        // SPEC_FULL §10.2: saturated positions are always named {var};
        // the multiset needed for digit/UUID inspection was discarded.
        return SegmentDecision::Parameter("{var}");
    }

    let unique = position.unique_count() as f64;
    let ratio = if position.total == 0 { 0.0 } else { unique / position.total as f64 };

    if ratio >= threshold {
        let values = position.values().expect("not saturated implies values present");
        SegmentDecision::Parameter(choose_name(values, position.total))
    } else {
        // SPEC_FULL §10.2: below threshold, the segment stays literal
        // regardless of digit/UUID shape — naming only applies once a
        // position is parameterized at all.
        SegmentDecision::Literal
    }
}

fn choose_name(values: &FxHashMap<String, u64>, total: u64) -> &'static str {
    if total == 0 {
        return "{var}";
    }
    let digit_occurrences: u64 = values
        .iter()
        .filter(|(v, _)| is_all_decimal_digits(v))
        .map(|(_, count)| *count)
        .sum();

    if (digit_occurrences as f64 / total as f64) >= 0.9 {
        return "{num}";
    }
    if values.keys().any(|v| is_uuid_shape(v)) {
        return "{id}";
    }
    "{var}"
}

fn is_all_decimal_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// A 36-char `8-4-4-4-12` hex-with-dashes string, or a 32-char bare hex string.
fn is_uuid_shape(s: &str) -> bool {
    if s.len() == 36 {
        let parts: Vec<&str> = s.split('-').collect();
        return parts.len() == 5
            && [8usize, 4, 4, 4, 12]
                .iter()
                .zip(parts.iter())
                .all(|(len, part)| part.len() == *len && part.chars().all(|c| c.is_ascii_hexdigit()));
    }
    if s.len() == 32 {
        return s.chars().all(|c| c.is_ascii_hexdigit());
    }
    false
}

/// Build a pattern string for one distinct path, given the corpus-wide
/// segment analysis (§4.4 phase 2).
///
/// A position-level "parameterized" verdict is a verdict about the
/// *position*, not about every value observed there (SPEC_FULL §10.7): a
/// literal value that on its own recurred at least `min_endpoint_samples`
/// times is exempted from folding into the parameter, since it carries
/// enough independent support to be its own endpoint. This is what lets
/// `/api/users/profile` (10 occurrences) survive as a literal alongside
/// `/api/users/{num}` even though position 2 is otherwise parameterized
/// by the 200 single-occurrence numeric paths sharing it (§8 S3).
pub fn build_pattern(
    segments: &[&str],
    analysis: &super::segment_stats::SegmentAnalysis,
    threshold: f64,
    min_sample_size: u64,
    min_endpoint_samples: u64,
) -> String {
    let count = segments.len();
    let parts: Vec<String> = segments
        .iter()
        .enumerate()
        .map(|(idx, seg)| {
            let position = analysis.position(count, idx);
            let decision = position.map(|p| decide_segment(p, threshold, min_sample_size)).unwrap_or(SegmentDecision::Literal);
            match decision {
                SegmentDecision::Literal => seg.to_string(),
                SegmentDecision::Parameter(token) => {
                    let own_count = position.and_then(|p| p.values()).and_then(|v| v.get(*seg)).copied().unwrap_or(0);
                    if own_count >= min_endpoint_samples {
                        seg.to_string()
                    } else {
                        token.to_string()
                    }
                }
            }
        })
        .collect();
    format!("/{}", parts.join("/"))
}
