use super::classification::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-contributor rollup inside the timeline insights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributorProfile {
    pub display_name: String,
    pub commit_count: usize,
    /// Set-union of tags across this contributor's commits
    pub tags: Vec<String>,
}

/// (category, timestamp, message) tuple for the recent-activity strip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentActivity {
    pub category: Category,
    pub timestamp: String,
    pub message: String,
}

/// Aggregate over a classified commit collection. Pure derivation,
/// recomputed on demand, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineInsights {
    pub total_commits: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_commit_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_commit_time: Option<String>,
    pub distinct_contributor_count: usize,
    pub category_counts: BTreeMap<String, usize>,
    pub contributor_profiles: BTreeMap<String, ContributorProfile>,
    pub tag_frequency: BTreeMap<String, usize>,
    pub recent_activity: Vec<RecentActivity>,
}

/// Top contributor entry in the onboarding narrative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpertContact {
    pub handle: String,
    pub commit_count: usize,
    /// Up to 3 leading tags for this contributor
    pub leading_tags: Vec<String>,
}

/// Category share entry in the onboarding narrative. Percentages are rounded
/// independently and need not sum to 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusArea {
    pub category: String,
    pub count: usize,
    pub percentage: u32,
}

/// Templated onboarding summary derived from the insights.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingNarrative {
    pub project_story: String,
    pub expert_contacts: Vec<ExpertContact>,
    pub focus_areas: Vec<FocusArea>,
}
