use crate::classifier::{Classification, Classifier, StatusBucket};
use crate::work_order::WorkOrder;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Badge counts for the dashboard header.
///
/// `primary` holds one bucket per work order and always sums to `total`.
/// `flagged` counts each predicate on its own, the way the filter badges do, so a
/// work order can appear under several of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total: usize,
    pub primary: BTreeMap<StatusBucket, usize>,
    pub flagged: BTreeMap<StatusBucket, usize>,
    pub frequency_breakdown: BTreeMap<String, usize>,
    pub evaluated_at: Option<DateTime<Utc>>,
}

impl DashboardSummary {
    pub fn build(classifier: &Classifier, work_orders: &[WorkOrder], now: DateTime<Utc>) -> Self {
        let classifications = classifier.classify_all(work_orders, now);
        Self::from_classifications(work_orders, &classifications, now)
    }

    pub fn from_classifications(
        work_orders: &[WorkOrder],
        classifications: &[Classification],
        now: DateTime<Utc>,
    ) -> Self {
        let mut primary: BTreeMap<StatusBucket, usize> =
            StatusBucket::ALL.iter().map(|bucket| (*bucket, 0)).collect();
        let mut flagged = primary.clone();

        for classification in classifications {
            *primary.entry(classification.bucket).or_insert(0) += 1;
            for bucket in StatusBucket::ALL {
                if classification.has_flag(bucket) {
                    *flagged.entry(bucket).or_insert(0) += 1;
                }
            }
        }

        let mut frequency_breakdown = BTreeMap::new();
        for work_order in work_orders {
            let key = match work_order.schedule.frequency() {
                Some(frequency) => frequency.as_str().to_string(),
                None if work_order.schedule.has_frequency() => "custom".to_string(),
                None => "unspecified".to_string(),
            };
            *frequency_breakdown.entry(key).or_insert(0) += 1;
        }

        Self {
            total: classifications.len(),
            primary,
            flagged,
            frequency_breakdown,
            evaluated_at: Some(now),
        }
    }

    pub fn primary_count(&self, bucket: StatusBucket) -> usize {
        self.primary.get(&bucket).copied().unwrap_or(0)
    }

    pub fn flagged_count(&self, bucket: StatusBucket) -> usize {
        self.flagged.get(&bucket).copied().unwrap_or(0)
    }

    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("total={}", self.total));
        for bucket in StatusBucket::ALL {
            let count = self.primary_count(bucket);
            if count > 0 {
                parts.push(format!("{}={}", bucket.as_str(), count));
            }
        }
        if !self.frequency_breakdown.is_empty() {
            let cadence = self
                .frequency_breakdown
                .iter()
                .map(|(frequency, count)| format!("{frequency}:{count}"))
                .collect::<Vec<_>>()
                .join(",");
            parts.push(format!("cadence={cadence}"));
        }
        parts.join(", ")
    }
}
