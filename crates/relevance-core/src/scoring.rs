//! Relevance combination: reduces per-attachment similarities to one score.
//!
//! Each modality (images, links) is represented by its single best match, so
//! an irrelevant or broken attachment never drags the comment down. The two
//! representatives are then mixed with fixed weights.

use serde::{Deserialize, Serialize};

use crate::config::ScoringConfig;
use crate::math::cosine_similarity;

/// How a modality with no usable attachment enters the weighted sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingModalityPolicy {
    /// Compare the text against an all-zero vector, so the modality keeps its
    /// weight and contributes 0.
    #[default]
    ZeroFill,
    /// Drop the modality and rescale the remaining weights to sum to 1.
    Renormalize,
}

/// Pick the best (maximum) similarity, ignoring NaN entries.
pub fn best_similarity(similarities: &[f32]) -> Option<f32> {
    similarities
        .iter()
        .copied()
        .filter(|s| !s.is_nan())
        .fold(None, |best, s| match best {
            Some(b) if b >= s => Some(b),
            _ => Some(s),
        })
}

/// Weighted combination of the best image and best link similarity.
#[derive(Debug, Clone)]
pub struct RelevanceCombinator {
    image_weight: f32,
    link_weight: f32,
    policy: MissingModalityPolicy,
}

impl Default for RelevanceCombinator {
    fn default() -> Self {
        Self::new(&ScoringConfig::default())
    }
}

impl RelevanceCombinator {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            image_weight: config.image_weight,
            link_weight: config.link_weight,
            policy: config.missing_modality,
        }
    }

    pub fn policy(&self) -> MissingModalityPolicy {
        self.policy
    }

    /// Combine per-modality similarities into the final relevance score.
    ///
    /// `text_embedding` is only used to size the zero vector that stands in for
    /// a missing modality under [`MissingModalityPolicy::ZeroFill`].
    pub fn combine(
        &self,
        text_embedding: &[f32],
        image_similarities: &[f32],
        link_similarities: &[f32],
    ) -> f32 {
        let best_image = best_similarity(image_similarities);
        let best_link = best_similarity(link_similarities);

        match self.policy {
            MissingModalityPolicy::ZeroFill => {
                let zero = vec![0.0_f32; text_embedding.len()];
                let image = best_image.unwrap_or_else(|| cosine_similarity(text_embedding, &zero));
                let link = best_link.unwrap_or_else(|| cosine_similarity(text_embedding, &zero));
                self.image_weight * image + self.link_weight * link
            }
            MissingModalityPolicy::Renormalize => {
                let present = [
                    (self.image_weight, best_image),
                    (self.link_weight, best_link),
                ];
                let total_weight: f32 = present
                    .iter()
                    .filter(|(_, s)| s.is_some())
                    .map(|(w, _)| w)
                    .sum();
                if total_weight <= 0.0 {
                    return 0.0;
                }
                present
                    .iter()
                    .filter_map(|(w, s)| s.map(|s| w * s))
                    .sum::<f32>()
                    / total_weight
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text() -> Vec<f32> {
        vec![0.2, 0.5, -0.1, 0.8]
    }

    fn renormalizing() -> RelevanceCombinator {
        RelevanceCombinator::new(&ScoringConfig {
            missing_modality: MissingModalityPolicy::Renormalize,
            ..ScoringConfig::default()
        })
    }

    #[test]
    fn test_best_similarity_takes_maximum() {
        assert_eq!(best_similarity(&[0.3, 0.9, 0.1]), Some(0.9));
        assert_eq!(best_similarity(&[-0.4, -0.2]), Some(-0.2));
        assert_eq!(best_similarity(&[]), None);
    }

    #[test]
    fn test_best_similarity_ignores_nan() {
        assert_eq!(best_similarity(&[f32::NAN, 0.4]), Some(0.4));
        assert_eq!(best_similarity(&[f32::NAN]), None);
    }

    #[test]
    fn test_no_attachments_scores_zero() {
        let score = RelevanceCombinator::default().combine(&text(), &[], &[]);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_single_image_keeps_half_weight() {
        let score = RelevanceCombinator::default().combine(&text(), &[0.8], &[]);
        assert!((score - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_max_reduction_per_modality() {
        let score = RelevanceCombinator::default().combine(&text(), &[0.3, 0.9, 0.1], &[0.5]);
        assert!((score - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_order_does_not_matter() {
        let combinator = RelevanceCombinator::default();
        let a = combinator.combine(&text(), &[0.1, 0.3, 0.9], &[0.5, 0.2]);
        let b = combinator.combine(&text(), &[0.9, 0.1, 0.3], &[0.2, 0.5]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_custom_weights() {
        let combinator = RelevanceCombinator::new(&ScoringConfig {
            image_weight: 0.25,
            link_weight: 0.75,
            ..ScoringConfig::default()
        });
        let score = combinator.combine(&text(), &[0.4], &[0.8]);
        assert!((score - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_renormalize_reallocates_missing_weight() {
        let score = renormalizing().combine(&text(), &[0.8], &[]);
        assert!((score - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_renormalize_matches_zero_fill_when_complete() {
        let zero_fill = RelevanceCombinator::default().combine(&text(), &[0.6], &[0.2]);
        let renormalized = renormalizing().combine(&text(), &[0.6], &[0.2]);
        assert!((zero_fill - renormalized).abs() < 1e-6);
    }

    #[test]
    fn test_renormalize_without_attachments_scores_zero() {
        assert_eq!(renormalizing().combine(&text(), &[], &[]), 0.0);
    }
}
