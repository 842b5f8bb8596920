use serde::Serialize;

use super::{candidates::Candidate, scoring::Confidence};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Skip,
    Merge,
    Proceed,
}

impl Recommendation {
    pub fn for_confidence(confidence: Confidence) -> Self {
        match confidence {
            Confidence::Exact | Confidence::High => Recommendation::Skip,
            Confidence::Medium => Recommendation::Merge,
            Confidence::Low | Confidence::None => Recommendation::Proceed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Skip => "skip",
            Recommendation::Merge => "merge",
            Recommendation::Proceed => "proceed",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub is_duplicate: bool,
    pub duplicate_count: usize,
    pub best_match: Option<Candidate>,
    pub all_matches: Vec<Candidate>,
    pub recommendation: Recommendation,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Resolution {
    pub fn fail_open(error: impl std::fmt::Display) -> Self {
        Self {
            is_duplicate: false,
            duplicate_count: 0,
            best_match: None,
            all_matches: Vec::new(),
            recommendation: Recommendation::Proceed,
            message: "duplicate check failed, review manually".to_string(),
            error: Some(error.to_string()),
        }
    }
}

pub fn decide(candidates: Vec<Candidate>) -> Resolution {
    let Some(best) = candidates.first().cloned() else {
        return Resolution {
            is_duplicate: false,
            duplicate_count: 0,
            best_match: None,
            all_matches: candidates,
            recommendation: Recommendation::Proceed,
            message: "no duplicate found".to_string(),
            error: None,
        };
    };

    let recommendation = Recommendation::for_confidence(best.similarity.confidence);
    let message = match recommendation {
        Recommendation::Skip => format!("near-identical product \"{}\" already exists", best.product.name),
        Recommendation::Merge => format!("similar product \"{}\" found, merge suggested", best.product.name),
        Recommendation::Proceed => "weakly similar products found, safe to insert".to_string(),
    };

    Resolution {
        is_duplicate: true,
        duplicate_count: candidates.len(),
        best_match: Some(best),
        all_matches: candidates,
        recommendation,
        message,
        error: None,
    }
}
