//! Cosine similarity ranking
//!
//! Linear scan over every record. Pure: the same query vector, knowledge
//! base and `k` always produce the same ordered output.
//!
//! Ordering rules:
//! - records are sorted by similarity, highest first;
//! - equal similarities keep knowledge base order (stable sort);
//! - an undefined similarity (zero-norm vector, non-finite component,
//!   length mismatch) scores `f64::NEG_INFINITY` and so sinks to the end,
//!   still in knowledge base order.

use std::cmp::Ordering;

use crate::knowledge::{KnowledgeBase, KnowledgeRecord};

/// A record paired with its similarity to the query
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord<'a> {
    pub similarity: f64,
    pub record: &'a KnowledgeRecord,
}

/// Cosine of the angle between `a` and `b`
///
/// Each vector is divided by its largest absolute component first, so the
/// sums of squares neither underflow nor overflow at extreme magnitudes.
/// Returns `f64::NEG_INFINITY` when the value is undefined: either vector is
/// all zeros, the lengths differ, or a component is not finite.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() {
        return f64::NEG_INFINITY;
    }

    let (Some(scale_a), Some(scale_b)) = (max_abs(a), max_abs(b)) else {
        return f64::NEG_INFINITY;
    };

    let dot: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| (x / scale_a) * (y / scale_b))
        .sum();
    let norm_a = scaled_norm(a, scale_a);
    let norm_b = scaled_norm(b, scale_b);

    let sim = dot / (norm_a * norm_b);
    if sim.is_finite() {
        sim
    } else {
        f64::NEG_INFINITY
    }
}

/// Largest absolute component, if nonzero and finite
fn max_abs(v: &[f64]) -> Option<f64> {
    let max = v.iter().fold(0.0_f64, |m, x| m.max(x.abs()));
    (max > 0.0 && max.is_finite()).then_some(max)
}

/// Euclidean norm of `v / scale`; at least 1 because one component is ±1
fn scaled_norm(v: &[f64], scale: f64) -> f64 {
    v.iter()
        .map(|x| {
            let x = x / scale;
            x * x
        })
        .sum::<f64>()
        .sqrt()
}

/// Score every record and sort, highest similarity first
pub fn rank<'a>(query: &[f64], kb: &'a KnowledgeBase) -> Vec<ScoredRecord<'a>> {
    let mut scored: Vec<ScoredRecord<'a>> = kb
        .iter()
        .map(|record| ScoredRecord {
            similarity: cosine_similarity(query, &record.embedding),
            record,
        })
        .collect();

    // `sort_by` is stable, so ties keep knowledge base order
    scored.sort_by(|a, b| descending(a.similarity, b.similarity));
    scored
}

/// The first `min(k, len)` records of [`rank`]
pub fn top_k<'a>(query: &[f64], kb: &'a KnowledgeBase, k: usize) -> Vec<ScoredRecord<'a>> {
    let mut scored = rank(query, kb);
    scored.truncate(k);
    scored
}

/// Scores are never NaN here, and `-0.0` must tie with `0.0`
fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kb(embeddings: &[(&str, Vec<f64>)]) -> KnowledgeBase {
        KnowledgeBase::new(
            embeddings
                .iter()
                .map(|(name, e)| KnowledgeRecord::new(*name, "...").with_embedding(e.clone()))
                .collect(),
        )
    }

    fn names(scored: &[ScoredRecord<'_>]) -> Vec<String> {
        scored.iter().map(|s| s.record.name.clone()).collect()
    }

    #[test]
    fn test_flu_cold_scenario() {
        let kb = kb(&[("flu", vec![1.0, 0.0]), ("cold", vec![0.0, 1.0])]);
        let top = top_k(&[1.0, 0.0], &kb, 1);
        assert_eq!(names(&top), vec!["flu"]);
        assert_eq!(top[0].similarity, 1.0);
    }

    #[test]
    fn test_self_similarity_is_one() {
        let v = [0.3, -1.2, 4.5];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_opposite_vectors() {
        assert!((cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_norm_is_lowest() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), f64::NEG_INFINITY);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 0.0]), f64::NEG_INFINITY);
    }

    #[test]
    fn test_extreme_magnitudes() {
        let tiny = [1e-170, 2e-170];
        let huge = [1e170, 2e170];
        assert!((cosine_similarity(&tiny, &tiny) - 1.0).abs() < 1e-12);
        assert!((cosine_similarity(&huge, &huge) - 1.0).abs() < 1e-12);
        assert!((cosine_similarity(&tiny, &huge) - 1.0).abs() < 1e-12);
        assert!((cosine_similarity(&[5e-324, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_tiny_aligned_record_outranks_larger_one() {
        let kb = kb(&[("a", vec![0.0, 1.0]), ("b", vec![1e-170, 2e-170])]);
        let top = top_k(&[1.0, 2.0], &kb, 1);
        assert_eq!(names(&top), vec!["b"]);
        assert!((top[0].similarity - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_non_finite_component_is_lowest() {
        assert_eq!(cosine_similarity(&[f64::INFINITY, 1.0], &[1.0, 0.0]), f64::NEG_INFINITY);
        assert_eq!(cosine_similarity(&[f64::NAN, 1.0], &[1.0, 0.0]), f64::NEG_INFINITY);
    }

    #[test]
    fn test_length_mismatch_is_lowest() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), f64::NEG_INFINITY);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let kb = kb(&[
            ("a", vec![1.0, 1.0]),
            ("b", vec![2.0, 0.0]),
            ("c", vec![2.0, 2.0]),
            ("d", vec![5.0, 0.0]),
        ]);
        let ranked = rank(&[1.0, 0.0], &kb);
        assert_eq!(names(&ranked), vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_undefined_scores_sink_in_order() {
        let kb = kb(&[
            ("zero1", vec![0.0, 0.0]),
            ("neg", vec![-1.0, 0.0]),
            ("zero2", vec![0.0, 0.0]),
            ("pos", vec![1.0, 0.0]),
        ]);
        let ranked = rank(&[1.0, 0.0], &kb);
        assert_eq!(names(&ranked), vec!["pos", "neg", "zero1", "zero2"]);
    }

    #[test]
    fn test_k_larger_than_base() {
        let kb = kb(&[("flu", vec![1.0, 0.0]), ("cold", vec![0.0, 1.0])]);
        assert_eq!(top_k(&[0.0, 1.0], &kb, 10).len(), 2);
        assert!(top_k(&[0.0, 1.0], &KnowledgeBase::default(), 3).is_empty());
    }

    #[test]
    fn test_k_zero() {
        let kb = kb(&[("flu", vec![1.0, 0.0])]);
        assert!(top_k(&[1.0, 0.0], &kb, 0).is_empty());
    }
}
