//! Similarity primitives shared by the matcher and the unifier.

/// Normalized string similarity in `[0, 1]`.
///
/// Jaro-Winkler, case-folded, taken as the maximum over the full
/// candidate name and each of its tokens. The prefix boost suits
/// entity-name comparison, where variants of the same name share a stem
/// ("democrats" / "democratic party"); the per-token pass lets a short
/// query like "Frey" score against the surname in "Jacob Frey", which
/// whole-string Jaro-Winkler misses entirely.
pub fn name_similarity(query: &str, candidate: &str) -> f64 {
    let query = query.to_lowercase();
    let candidate = candidate.to_lowercase();

    let mut best = strsim::jaro_winkler(&query, &candidate);
    for token in candidate.split_whitespace() {
        best = best.max(strsim::jaro_winkler(&query, token));
    }
    best
}

/// Cosine similarity between two vectors.
///
/// Returns 0.0 for mismatched dimensions or zero-norm inputs.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
