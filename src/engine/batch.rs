use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;

use crate::{
    config::DedupConfig,
    error::{AppError, AppResult},
    model::ProductRecord,
};

use super::scoring::score;

#[derive(Debug, Clone)]
pub struct DuplicateGroup {
    pub canonical: ProductRecord,
    pub duplicates: Vec<ProductRecord>,
}

impl DuplicateGroup {
    pub fn member_count(&self) -> usize {
        self.duplicates.len() + 1
    }
}

/// Greedy single-pass grouping in corpus order. Similarity is not transitive, so
/// with A~B, B~C and A!~C the groups depend on input order.
pub fn group_duplicates(entries: &[ProductRecord], config: &DedupConfig) -> Vec<DuplicateGroup> {
    let mut processed: HashSet<Uuid> = HashSet::with_capacity(entries.len());
    let mut groups = Vec::new();

    for (index, head) in entries.iter().enumerate() {
        if processed.contains(&head.id) {
            continue;
        }

        let mut members = vec![head];
        for other in &entries[index + 1..] {
            if processed.contains(&other.id) {
                continue;
            }
            if score(head, other, None, None, config).is_duplicate {
                members.push(other);
                processed.insert(other.id);
            }
        }
        processed.insert(head.id);

        if members.len() > 1 {
            // stable: equal timestamps keep first-seen order
            members.sort_by_key(|member| member.created_at);
            let mut members = members.into_iter().cloned();
            if let Some(canonical) = members.next() {
                groups.push(DuplicateGroup {
                    canonical,
                    duplicates: members.collect(),
                });
            }
        }
    }

    groups
}

#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    pub dry_run: bool,
    pub threshold: Option<f64>,
    pub max_processed: usize,
}

impl BatchOptions {
    pub fn dry_run(max_processed: usize) -> Self {
        Self {
            dry_run: true,
            threshold: None,
            max_processed,
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if let Some(threshold) = self.threshold {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(AppError::BadRequest(format!(
                    "threshold must be within [0, 1], got {threshold}"
                )));
            }
        }
        if self.max_processed == 0 {
            return Err(AppError::BadRequest(
                "max_processed must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn effective_config(&self, base: &DedupConfig) -> DedupConfig {
        match self.threshold {
            Some(threshold) => base.with_overall_threshold(threshold),
            None => base.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Remove,
    WouldRemove,
}

#[derive(Debug, Clone, Serialize)]
pub struct Operation {
    #[serde(rename = "type")]
    pub kind: OperationKind,
    pub duplicate_id: Uuid,
    pub duplicate_name: String,
    pub master_id: Uuid,
    pub master_name: String,
}

impl Operation {
    fn new(kind: OperationKind, duplicate: &ProductRecord, master: &ProductRecord) -> Self {
        Self {
            kind,
            duplicate_id: duplicate.id,
            duplicate_name: duplicate.name.clone(),
            master_id: master.id,
            master_name: master.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeletionError {
    pub product_id: Uuid,
    pub product_name: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub canonical_id: Uuid,
    pub canonical_name: String,
    pub duplicate_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportSummary {
    pub total_products: usize,
    pub processed_products: usize,
    pub duplicate_groups: usize,
    pub duplicates_found: usize,
    pub duplicates_removed: usize,
    pub errors: usize,
    pub estimated_reduction: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DeduplicationReport {
    pub dry_run: bool,
    pub processed: usize,
    pub duplicates_found: usize,
    pub duplicates_removed: usize,
    pub errors: Vec<DeletionError>,
    pub operations: Vec<Operation>,
    pub groups: Vec<GroupSummary>,
    pub summary: ReportSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeduplicationReport {
    pub fn begin(
        dry_run: bool,
        total_products: usize,
        processed: usize,
        groups: &[DuplicateGroup],
    ) -> Self {
        let mut report = Self {
            dry_run,
            processed,
            duplicates_found: groups.iter().map(|g| g.duplicates.len()).sum(),
            groups: groups
                .iter()
                .map(|group| GroupSummary {
                    canonical_id: group.canonical.id,
                    canonical_name: group.canonical.name.clone(),
                    duplicate_ids: group.duplicates.iter().map(|d| d.id).collect(),
                })
                .collect(),
            ..Default::default()
        };
        report.summary.total_products = total_products;

        if dry_run {
            for group in groups {
                for duplicate in &group.duplicates {
                    report.operations.push(Operation::new(
                        OperationKind::WouldRemove,
                        duplicate,
                        &group.canonical,
                    ));
                }
            }
        }

        report
    }

    pub fn failed(dry_run: bool, error: impl std::fmt::Display) -> Self {
        Self {
            dry_run,
            error: Some(error.to_string()),
            ..Default::default()
        }
    }

    pub fn record_removal(&mut self, duplicate: &ProductRecord, master: &ProductRecord) {
        self.duplicates_removed += 1;
        self.operations
            .push(Operation::new(OperationKind::Remove, duplicate, master));
    }

    pub fn record_failure(&mut self, duplicate: &ProductRecord, message: impl Into<String>) {
        self.errors.push(DeletionError {
            product_id: duplicate.id,
            product_name: duplicate.name.clone(),
            message: message.into(),
        });
    }

    pub fn finish(mut self) -> Self {
        self.summary = ReportSummary {
            total_products: self.summary.total_products,
            processed_products: self.processed,
            duplicate_groups: self.groups.len(),
            duplicates_found: self.duplicates_found,
            duplicates_removed: self.duplicates_removed,
            errors: self.errors.len(),
            estimated_reduction: estimated_reduction(
                self.duplicates_found,
                self.summary.total_products,
            ),
        };
        self
    }
}

pub fn estimated_reduction(found: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let percent = found as f64 / total as f64 * 100.0;
    (percent * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::record;

    fn five_records() -> Vec<ProductRecord> {
        vec![
            record("乐事", "原味薯片", "膨化食品", 5),
            record("康师傅", "红烧牛肉面", "方便面", 1),
            record("乐事", "原味薯片", "膨化食品", 0),
            record("农夫山泉", "饮用天然水", "饮料", 2),
            record("乐事", "经典原味薯片", "膨化食品", 3),
        ]
    }

    #[test]
    fn oldest_member_is_canonical() {
        let corpus = five_records();
        let groups = group_duplicates(&corpus, &DedupConfig::default());

        assert_eq!(groups.len(), 1);
        let group = &groups[0];
        assert_eq!(group.member_count(), 3);
        assert_eq!(group.canonical.id, corpus[2].id);
        let removable: Vec<_> = group.duplicates.iter().map(|d| d.id).collect();
        assert_eq!(removable, vec![corpus[4].id, corpus[0].id]);
    }

    #[test]
    fn timestamp_ties_keep_first_seen_order() {
        let corpus = vec![
            record("乐事", "原味薯片", "膨化食品", 0),
            record("乐事", "原味薯片", "膨化食品", 0),
        ];
        let groups = group_duplicates(&corpus, &DedupConfig::default());
        assert_eq!(groups[0].canonical.id, corpus[0].id);
        assert_eq!(groups[0].duplicates[0].id, corpus[1].id);
    }

    #[test]
    fn each_record_joins_at_most_one_group() {
        let corpus: Vec<_> = (0..4)
            .map(|i| record("乐事", "原味薯片", "膨化食品", i))
            .collect();
        let groups = group_duplicates(&corpus, &DedupConfig::default());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].duplicates.len(), 3);
    }

    // Known limitation: chains of pairwise duplicates are split depending on
    // which member the sweep meets first.
    #[test]
    fn greedy_grouping_depends_on_order() {
        let a = record("康师傅", "香辣牛肉面", "方便面", 0);
        let b = record("康师傅", "香辣鸡肉面", "方便面", 1);
        let c = record("康师傅", "麻辣鸡肉面", "方便面", 2);
        let config = DedupConfig::default();

        assert!(score(&a, &b, None, None, &config).is_duplicate);
        assert!(score(&b, &c, None, None, &config).is_duplicate);
        assert!(!score(&a, &c, None, None, &config).is_duplicate);

        let groups = group_duplicates(&[a.clone(), b.clone(), c.clone()], &config);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].canonical.id, a.id);
        assert_eq!(groups[0].duplicates.len(), 1);
        assert_eq!(groups[0].duplicates[0].id, b.id);

        let groups = group_duplicates(&[b.clone(), a.clone(), c.clone()], &config);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].member_count(), 3);
        assert_eq!(groups[0].canonical.id, a.id);
    }

    #[test]
    fn threshold_override_applies() {
        let corpus = vec![
            record("乐事", "薯片", "膨化食品", 0),
            record("品客", "薯片", "膨化食品", 1),
        ];
        let options = BatchOptions {
            dry_run: true,
            threshold: Some(0.5),
            max_processed: 10,
        };
        let loose = options.effective_config(&DedupConfig::default());
        assert_eq!(group_duplicates(&corpus, &loose).len(), 1);
        assert!(group_duplicates(&corpus, &DedupConfig::default()).is_empty());
    }

    #[test]
    fn options_validation() {
        assert!(BatchOptions::dry_run(100).validate().is_ok());
        assert!(BatchOptions::dry_run(0).validate().is_err());
        let options = BatchOptions {
            threshold: Some(1.5),
            ..BatchOptions::dry_run(10)
        };
        assert!(matches!(options.validate(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn dry_run_report_lists_planned_removals() {
        let corpus = five_records();
        let groups = group_duplicates(&corpus, &DedupConfig::default());
        let report = DeduplicationReport::begin(true, corpus.len(), corpus.len(), &groups).finish();

        assert_eq!(report.duplicates_found, 2);
        assert_eq!(report.duplicates_removed, 0);
        assert_eq!(report.operations.len(), 2);
        assert!(report
            .operations
            .iter()
            .all(|op| op.kind == OperationKind::WouldRemove && op.master_id == corpus[2].id));
        assert_eq!(report.summary.duplicate_groups, 1);
        assert_eq!(report.summary.estimated_reduction, 40.0);
    }

    #[test]
    fn removals_and_failures_are_tallied() {
        let corpus = five_records();
        let groups = group_duplicates(&corpus, &DedupConfig::default());
        let mut report = DeduplicationReport::begin(false, corpus.len(), corpus.len(), &groups);
        assert!(report.operations.is_empty());

        let group = &groups[0];
        report.record_removal(&group.duplicates[0], &group.canonical);
        report.record_failure(&group.duplicates[1], "row locked");
        let report = report.finish();

        assert_eq!(report.duplicates_removed, 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.summary.errors, 1);
        assert_eq!(report.operations[0].kind, OperationKind::Remove);
    }

    #[test]
    fn reduction_rounds_to_one_decimal() {
        assert_eq!(estimated_reduction(1, 3), 33.3);
        assert_eq!(estimated_reduction(2, 3), 66.7);
        assert_eq!(estimated_reduction(0, 0), 0.0);
    }

    #[test]
    fn serializes_operation_type() {
        let a = record("乐事", "薯片", "膨化食品", 0);
        let b = record("乐事", "薯片", "膨化食品", 1);
        let value = serde_json::to_value(Operation::new(OperationKind::WouldRemove, &b, &a)).unwrap();
        assert_eq!(value["type"], "would_remove");
        assert_eq!(value["master_name"], "薯片");
    }
}
