//! Phase 5: conflict resolution and low-support filtering (§4.4).
//!
//! Patterns are sorted by `(specificity desc, sampleCount desc)` and
//! walked in that order, skipping any pattern that conflicts with an
//! already-accepted pattern **of equal specificity** (SPEC_FULL §10.6:
//! a literal and a same-length parameterized pattern are not a genuine
//! routing ambiguity, so different specificity tiers never compete —
//! this reconciles §4.2's pure `conflict()` with S3's worked example).

use attestor_model::pattern;

use super::grouping::EndpointAccumulator;

pub fn resolve<'a>(mut candidates: Vec<(&'a str, &'a EndpointAccumulator)>, min_endpoint_samples: u64) -> Vec<(&'a str, &'a EndpointAccumulator)> {
    candidates.sort_by(|(a_path, a_acc), (b_path, b_acc)| {
        let a_spec = pattern::specificity(a_path);
        let b_spec = pattern::specificity(b_path);
        b_spec
            .cmp(&a_spec)
            .then_with(|| b_acc.sample_count().cmp(&a_acc.sample_count()))
            .then_with(|| a_path.cmp(b_path))
    });

    let mut accepted: Vec<(&str, &EndpointAccumulator)> = Vec::new();
    for (path, acc) in candidates {
        let spec = pattern::specificity(path);
        let conflicts = accepted
            .iter()
            .any(|(accepted_path, _)| pattern::specificity(accepted_path) == spec && pattern::conflict(accepted_path, path));
        if conflicts {
            continue;
        }
        accepted.push((path, acc));
    }

    accepted.into_iter().filter(|(_, acc)| acc.sample_count() >= min_endpoint_samples).collect()
}
