use serde::Serialize;
use uuid::Uuid;

use crate::{
    config::DedupConfig,
    model::CatalogEntry,
    util::{category::normalize_category, ingredients::ingredients_similarity, similarity::similarity},
};

// 0.3 + 0.4 + 0.2 is not exactly 0.9 in binary floating point
const SCORE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    None,
    Low,
    Medium,
    High,
    Exact,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::None => "none",
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
            Confidence::Exact => "exact",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Decision {
    WeightedScore,
    EscalatedByBrandName {
        brand_name_similarity: f64,
        weighted_confidence: Confidence,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct SimilarityResult {
    pub left_id: Option<Uuid>,
    pub right_id: Option<Uuid>,
    pub brand_similarity: f64,
    pub name_similarity: f64,
    pub category_match: f64,
    pub ingredients_similarity: f64,
    pub overall_similarity: f64,
    pub is_duplicate: bool,
    pub confidence: Confidence,
    pub decision: Decision,
    pub threshold_used: f64,
}

fn meets(value: f64, threshold: f64) -> bool {
    value + SCORE_EPSILON >= threshold
}

/// Score two catalog entries field by field and combine into a verdict.
///
/// Ingredient lists only contribute when both sides carry a non-empty one.
pub fn score<A, B>(
    left: &A,
    right: &B,
    left_ingredients: Option<&str>,
    right_ingredients: Option<&str>,
    config: &DedupConfig,
) -> SimilarityResult
where
    A: CatalogEntry + ?Sized,
    B: CatalogEntry + ?Sized,
{
    let weights = &config.weights;
    let thresholds = &config.thresholds;

    let brand_similarity = similarity(left.brand(), right.brand());
    let name_similarity = similarity(left.name(), right.name());
    let category_match =
        if normalize_category(left.category()) == normalize_category(right.category()) {
            1.0
        } else {
            0.0
        };

    let ingredients_similarity = match (
        left_ingredients.filter(|s| !s.is_empty()),
        right_ingredients.filter(|s| !s.is_empty()),
    ) {
        (Some(l), Some(r)) => ingredients_similarity(Some(l), Some(r), config.top_ingredients),
        _ => 0.0,
    };

    let overall_similarity = brand_similarity * weights.brand
        + name_similarity * weights.name
        + category_match * weights.category
        + ingredients_similarity * weights.ingredients;

    let weighted_confidence = if !meets(overall_similarity, thresholds.overall) {
        if meets(overall_similarity, thresholds.low) {
            Confidence::Low
        } else {
            Confidence::None
        }
    } else if meets(overall_similarity, thresholds.exact) {
        Confidence::Exact
    } else if meets(overall_similarity, thresholds.high) {
        Confidence::High
    } else {
        Confidence::Medium
    };

    let brand_name_similarity = (brand_similarity + name_similarity) / 2.0;
    let escalate = meets(brand_name_similarity, thresholds.brand_name)
        && category_match == 1.0
        && weighted_confidence < Confidence::High;

    let (confidence, decision) = if escalate {
        (
            Confidence::High,
            Decision::EscalatedByBrandName {
                brand_name_similarity,
                weighted_confidence,
            },
        )
    } else {
        (weighted_confidence, Decision::WeightedScore)
    };

    let is_duplicate = meets(overall_similarity, thresholds.overall) || escalate;

    if overall_similarity > thresholds.low {
        tracing::debug!(
            left = left.name(),
            right = right.name(),
            overall = overall_similarity,
            is_duplicate,
            confidence = confidence.as_str(),
            "pair scored"
        );
    }

    SimilarityResult {
        left_id: left.entry_id(),
        right_id: right.entry_id(),
        brand_similarity,
        name_similarity,
        category_match,
        ingredients_similarity,
        overall_similarity,
        is_duplicate,
        confidence,
        decision,
        threshold_used: thresholds.overall,
    }
}
