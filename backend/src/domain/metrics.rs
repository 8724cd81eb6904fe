//! Read-only aggregation over the entities in the org file.
//!
//! Mirrors what the portal's metrics dashboard renders: counts and
//! percentages by kind, users per group, and group types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::entity::EntityDocument;

/// One slice of a percentage breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KindBreakdown {
    pub name: String,
    pub count: usize,
    pub percentage: f64,
}

/// Users counted per group, sorted by count descending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupMembership {
    pub name: String,
    pub count: usize,
}

/// Aggregated catalog metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogMetrics {
    pub total_entities: usize,
    /// Entities by kind, percentage of the whole catalog.
    pub by_kind: Vec<KindBreakdown>,
    /// Users per group via `spec.memberOf`, most populous first.
    pub by_group: Vec<GroupMembership>,
    /// Groups by `spec.type`, percentage of all groups.
    pub by_type: Vec<KindBreakdown>,
}

/// Aggregate parsed entity documents into dashboard metrics.
pub fn aggregate(documents: &[EntityDocument]) -> CatalogMetrics {
    let total = documents.len();
    let mut kind_counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut group_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut type_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut group_total = 0usize;

    for document in documents {
        *kind_counts.entry(document.kind().as_str()).or_default() += 1;
        if let Some(member_of) = document.member_of() {
            for group in member_of {
                *group_counts.entry(group.clone()).or_default() += 1;
            }
        }
        if let Some(group_type) = document.group_type() {
            group_total += 1;
            *type_counts.entry(group_type.to_owned()).or_default() += 1;
        }
    }

    let by_kind = kind_counts
        .into_iter()
        .map(|(name, count)| KindBreakdown {
            name: name.to_owned(),
            count,
            percentage: percentage(count, total),
        })
        .collect();

    let mut by_group: Vec<GroupMembership> = group_counts
        .into_iter()
        .map(|(name, count)| GroupMembership { name, count })
        .collect();
    by_group.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));

    let by_type = type_counts
        .into_iter()
        .map(|(name, count)| KindBreakdown {
            name,
            count,
            percentage: percentage(count, group_total),
        })
        .collect();

    CatalogMetrics {
        total_entities: total,
        by_kind,
        by_group,
        by_type,
    }
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (count as f64 / total as f64) * 100.0
    }
}
