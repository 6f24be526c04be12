//! Timeline insight aggregation.
//!
//! Pure derivations over a classified commit set: timeline bounds,
//! contributor leaderboards, tag frequencies, and the templated onboarding
//! narrative. Recomputed fresh on every call, never incrementally updated,
//! never persisted.

use crate::models::{
    ClassifiedCommit, ContributorProfile, ExpertContact, FocusArea, OnboardingNarrative,
    RecentActivity, RepoMeta, TimelineInsights,
};
use chrono::DateTime;
use std::collections::BTreeMap;

const EXPERT_CONTACT_LIMIT: usize = 3;
const LEADING_TAG_LIMIT: usize = 3;
const FOCUS_AREA_LIMIT: usize = 5;

/// Summarize a commit collection. Input may arrive in any order.
pub fn summarize(commits: &[ClassifiedCommit], recent_limit: usize) -> TimelineInsights {
    let mut category_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut contributor_profiles: BTreeMap<String, ContributorProfile> = BTreeMap::new();
    let mut tag_frequency: BTreeMap<String, usize> = BTreeMap::new();

    let mut first: Option<(i64, &str)> = None;
    let mut last: Option<(i64, &str)> = None;

    for classified in commits {
        let commit = &classified.commit;

        *category_counts
            .entry(classified.classification.category.as_str().to_string())
            .or_insert(0) += 1;

        let identity = commit.author.identity().to_string();
        let profile = contributor_profiles
            .entry(identity)
            .or_insert_with(|| ContributorProfile {
                display_name: commit.author.name.clone(),
                commit_count: 0,
                tags: Vec::new(),
            });
        profile.commit_count += 1;
        for tag in &classified.classification.tags {
            if !profile.tags.contains(tag) {
                profile.tags.push(tag.clone());
            }
            *tag_frequency.entry(tag.clone()).or_insert(0) += 1;
        }

        if let Some(epoch) = parse_epoch(&commit.timestamp) {
            if first.is_none_or(|(min, _)| epoch < min) {
                first = Some((epoch, &commit.timestamp));
            }
            if last.is_none_or(|(max, _)| epoch > max) {
                last = Some((epoch, &commit.timestamp));
            }
        }
    }

    TimelineInsights {
        total_commits: commits.len(),
        first_commit_time: first.map(|(_, ts)| ts.to_string()),
        last_commit_time: last.map(|(_, ts)| ts.to_string()),
        distinct_contributor_count: contributor_profiles.len(),
        category_counts,
        contributor_profiles,
        tag_frequency,
        recent_activity: recent_activity(commits, recent_limit),
    }
}

/// Build the onboarding narrative from a commit set and its insights.
pub fn narrate(
    repo: Option<&RepoMeta>,
    insights: &TimelineInsights,
) -> OnboardingNarrative {
    if insights.total_commits == 0 {
        return OnboardingNarrative {
            project_story: "No commit history has been analyzed for this repository yet."
                .to_string(),
            expert_contacts: Vec::new(),
            focus_areas: Vec::new(),
        };
    }

    OnboardingNarrative {
        project_story: project_story(repo, insights),
        expert_contacts: expert_contacts(insights),
        focus_areas: focus_areas(insights),
    }
}

fn project_story(repo: Option<&RepoMeta>, insights: &TimelineInsights) -> String {
    let name = repo
        .map(|r| r.full_name.as_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("This project");
    let since = repo
        .and_then(|r| r.created_at.as_deref())
        .or(insights.first_commit_time.as_deref())
        .and_then(format_date);

    let contributors = insights.distinct_contributor_count;
    let plural = if contributors == 1 { "contributor" } else { "contributors" };

    match since {
        Some(date) => format!(
            "{name} has been in development since {date}, with {count} commits from {contributors} {plural} in the analyzed window.",
            count = insights.total_commits,
        ),
        None => format!(
            "{name} has {count} analyzed commits from {contributors} {plural}.",
            count = insights.total_commits,
        ),
    }
}

/// Top contributors by commit count. Ties break on handle lexical order so
/// the ranking never depends on map iteration or sort stability.
fn expert_contacts(insights: &TimelineInsights) -> Vec<ExpertContact> {
    let mut ranked: Vec<(&String, &ContributorProfile)> =
        insights.contributor_profiles.iter().collect();
    ranked.sort_by(|(a_handle, a), (b_handle, b)| {
        b.commit_count
            .cmp(&a.commit_count)
            .then_with(|| a_handle.cmp(b_handle))
    });

    ranked
        .into_iter()
        .take(EXPERT_CONTACT_LIMIT)
        .map(|(handle, profile)| ExpertContact {
            handle: handle.clone(),
            commit_count: profile.commit_count,
            leading_tags: profile.tags.iter().take(LEADING_TAG_LIMIT).cloned().collect(),
        })
        .collect()
}

fn focus_areas(insights: &TimelineInsights) -> Vec<FocusArea> {
    // total_commits > 0 is guaranteed by the caller; keep the divisor
    // explicit anyway so the percentage can never divide by zero.
    let total = insights.total_commits.max(1) as f64;

    let mut ranked: Vec<(&String, &usize)> = insights.category_counts.iter().collect();
    ranked.sort_by(|(a_name, a), (b_name, b)| b.cmp(a).then_with(|| a_name.cmp(b_name)));

    ranked
        .into_iter()
        .take(FOCUS_AREA_LIMIT)
        .map(|(category, &count)| FocusArea {
            category: category.clone(),
            count,
            percentage: ((count as f64 / total) * 100.0).round() as u32,
        })
        .collect()
}

fn recent_activity(commits: &[ClassifiedCommit], limit: usize) -> Vec<RecentActivity> {
    let mut ordered: Vec<&ClassifiedCommit> = commits.iter().collect();
    ordered.sort_by(|a, b| {
        let a_epoch = parse_epoch(&a.commit.timestamp).unwrap_or(i64::MIN);
        let b_epoch = parse_epoch(&b.commit.timestamp).unwrap_or(i64::MIN);
        b_epoch
            .cmp(&a_epoch)
            .then_with(|| a.commit.id.cmp(&b.commit.id))
    });

    ordered
        .into_iter()
        .take(limit)
        .map(|classified| RecentActivity {
            category: classified.classification.category,
            timestamp: classified.commit.timestamp.clone(),
            message: classified.commit.message.clone(),
        })
        .collect()
}

fn parse_epoch(timestamp: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(timestamp)
        .ok()
        .map(|dt| dt.timestamp())
}

fn format_date(timestamp: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(timestamp)
        .ok()
        .map(|dt| dt.format("%B %Y").to_string())
}
