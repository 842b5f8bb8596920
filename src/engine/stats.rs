use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::{config::DedupConfig, model::ProductRecord};

use super::{batch::estimated_reduction, scoring::score};

const TOP_PAIRS: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct DuplicatePair {
    pub left_id: Uuid,
    pub left_name: String,
    pub right_id: Uuid,
    pub right_name: String,
    pub similarity: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DedupStats {
    pub total_products: usize,
    pub sampled_products: usize,
    pub potential_duplicates: usize,
    pub duplicate_groups: usize,
    pub estimated_reduction: f64,
    pub top_duplicates: Vec<DuplicatePair>,
}

pub fn sample_stats(corpus: &[ProductRecord], config: &DedupConfig) -> DedupStats {
    let sample = &corpus[..corpus.len().min(config.stats_sample_size)];

    let mut potential_duplicates = 0;
    let mut pairs: HashMap<(Uuid, Uuid), DuplicatePair> = HashMap::new();
    for (i, left) in sample.iter().enumerate() {
        for right in &sample[i + 1..] {
            let result = score(left, right, None, None, config);
            if !result.is_duplicate {
                continue;
            }
            potential_duplicates += 1;
            pairs.insert(
                (left.id, right.id),
                DuplicatePair {
                    left_id: left.id,
                    left_name: left.name.clone(),
                    right_id: right.id,
                    right_name: right.name.clone(),
                    similarity: (result.overall_similarity * 1000.0).round() / 1000.0,
                },
            );
        }
    }

    let duplicate_groups = pairs.len();
    let mut top_duplicates: Vec<DuplicatePair> = pairs.into_values().collect();
    top_duplicates.sort_by(|a, b| {
        b.similarity
            .total_cmp(&a.similarity)
            .then_with(|| a.left_name.cmp(&b.left_name))
            .then_with(|| a.right_name.cmp(&b.right_name))
    });
    top_duplicates.truncate(TOP_PAIRS);

    let stats = DedupStats {
        total_products: corpus.len(),
        sampled_products: sample.len(),
        potential_duplicates,
        duplicate_groups,
        estimated_reduction: estimated_reduction(potential_duplicates, corpus.len()),
        top_duplicates,
    };

    tracing::info!(
        total = stats.total_products,
        sampled = stats.sampled_products,
        potential_duplicates = stats.potential_duplicates,
        "dedup stats sampled"
    );

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::record;

    #[test]
    fn empty_corpus() {
        let stats = sample_stats(&[], &DedupConfig::default());
        assert_eq!(stats.total_products, 0);
        assert_eq!(stats.potential_duplicates, 0);
        assert_eq!(stats.estimated_reduction, 0.0);
        assert!(stats.top_duplicates.is_empty());
    }

    #[test]
    fn counts_pairs_within_sample() {
        let corpus = vec![
            record("乐事", "原味薯片", "膨化食品", 0),
            record("乐事", "原味薯片", "膨化食品", 1),
            record("乐事", "原味薯片", "膨化食品", 2),
            record("康师傅", "红烧牛肉面", "方便面", 3),
        ];
        let stats = sample_stats(&corpus, &DedupConfig::default());
        // three mutually duplicate records form three pairs
        assert_eq!(stats.potential_duplicates, 3);
        assert_eq!(stats.duplicate_groups, 3);
        assert_eq!(stats.estimated_reduction, 75.0);
        assert_eq!(stats.top_duplicates.len(), 3);
        assert_eq!(stats.top_duplicates[0].similarity, 0.9);
    }

    #[test]
    fn only_prefix_is_sampled() {
        let mut corpus = vec![record("康师傅", "红烧牛肉面", "方便面", 0)];
        corpus.push(record("乐事", "原味薯片", "膨化食品", 1));
        corpus.push(record("乐事", "原味薯片", "膨化食品", 2));

        let mut config = DedupConfig::default();
        config.stats_sample_size = 2;
        let stats = sample_stats(&corpus, &config);
        assert_eq!(stats.total_products, 3);
        assert_eq!(stats.sampled_products, 2);
        assert_eq!(stats.potential_duplicates, 0);
    }

    #[test]
    fn keeps_top_five() {
        let corpus: Vec<_> = (0..5)
            .map(|i| record("乐事", "原味薯片", "膨化食品", i))
            .collect();
        let stats = sample_stats(&corpus, &DedupConfig::default());
        assert_eq!(stats.potential_duplicates, 10);
        assert_eq!(stats.top_duplicates.len(), 5);
    }
}
