//! Shared commit classifier.
//!
//! One deterministic rule set serves both ingestion paths; the tunables the
//! paths disagree on (file-count thresholds, forge-derived tags) live in
//! [`ClassifierConfig`]. Rule order encodes priority: first match wins.

use crate::models::{Category, Classification, Importance};

const INITIAL_PHRASES: [&str; 2] = ["initial commit", "first commit"];
const ARCHITECTURE_PATH_HINTS: [&str; 5] = ["docker", "config", "migration", "setup", "infra"];
const ARCHITECTURE_KEYWORDS: [&str; 5] =
    ["migrate", "architecture", "infrastructure", "docker", "deploy"];
const FEATURE_KEYWORDS: [&str; 7] =
    ["feat", "feature", "add", "implement", "launch", "release", "new"];
const BUGFIX_KEYWORDS: [&str; 5] = ["fix", "bug", "error", "issue", "patch"];
const REFACTOR_KEYWORDS: [&str; 6] =
    ["refactor", "optimize", "improve", "clean", "restructure", "update"];
const MANIFEST_FILES: [&str; 7] = [
    "package.json",
    "cargo.toml",
    "pyproject.toml",
    "go.mod",
    "pom.xml",
    "gemfile",
    "composer.json",
];

/// Path-dependent classification policy.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Changed-file count above which a commit is structural work
    pub architecture_file_threshold: Option<usize>,
    /// Changed-file count above which a commit counts as feature work
    pub feature_file_threshold: Option<usize>,
    /// Derive `api`/`ui` tags from filenames (remote path behavior)
    pub forge_tags: bool,
}

impl ClassifierConfig {
    /// Bulk/local-clone policy: file-count thresholds active, no forge tags.
    pub fn local() -> Self {
        ClassifierConfig {
            architecture_file_threshold: Some(15),
            feature_file_threshold: Some(8),
            forge_tags: false,
        }
    }

    /// Remote-API policy: no file-count thresholds, forge tags active.
    pub fn remote() -> Self {
        ClassifierConfig {
            architecture_file_threshold: None,
            feature_file_threshold: None,
            forge_tags: true,
        }
    }
}

/// Classify one commit from its message text and changed-file list.
///
/// Total and pure: every input yields a classification, identical inputs
/// yield identical outputs. Matching is case-insensitive substring
/// containment throughout.
pub fn classify<S: AsRef<str>>(
    message: &str,
    file_paths: &[S],
    config: &ClassifierConfig,
) -> Classification {
    let msg = message.to_lowercase();
    let paths: Vec<String> = file_paths
        .iter()
        .map(|p| p.as_ref().to_lowercase())
        .collect();
    let file_count = paths.len();

    let category = decide_category(&msg, &paths, file_count, config);
    let tags = collect_tags(&msg, &paths, config);

    let importance = match category {
        Some(matched) => matched.default_importance(),
        // Generic fallback: lowest importance regardless of the default
        // category's usual weight.
        None => Importance::Low,
    };

    Classification {
        category: category.unwrap_or(Category::Feature),
        importance,
        tags,
    }
}

fn decide_category(
    msg: &str,
    paths: &[String],
    file_count: usize,
    config: &ClassifierConfig,
) -> Option<Category> {
    if contains_any(msg, &INITIAL_PHRASES) {
        return Some(Category::Initial);
    }

    let big_change = config
        .architecture_file_threshold
        .is_some_and(|limit| file_count > limit);
    if any_path_contains(paths, &ARCHITECTURE_PATH_HINTS)
        || contains_any(msg, &ARCHITECTURE_KEYWORDS)
        || big_change
    {
        return Some(Category::Architecture);
    }

    let broad_change = config
        .feature_file_threshold
        .is_some_and(|limit| file_count > limit);
    if contains_any(msg, &FEATURE_KEYWORDS) || broad_change {
        return Some(Category::Feature);
    }

    if contains_any(msg, &BUGFIX_KEYWORDS) {
        return Some(Category::Bugfix);
    }

    if msg.contains("doc") || msg.contains("readme") || has_docs_file(paths) {
        return Some(Category::Docs);
    }

    if msg.contains("config") || has_config_file(paths) {
        return Some(Category::Config);
    }

    if msg.contains("test") || any_path_contains(paths, &["test", "spec"]) {
        return Some(Category::Test);
    }

    if contains_any(msg, &REFACTOR_KEYWORDS) {
        return Some(Category::Refactor);
    }

    None
}

/// Tag accrual is independent of the category decision: a commit keeps every
/// tag whose rule matched, and receives `general` only when nothing did.
fn collect_tags(msg: &str, paths: &[String], config: &ClassifierConfig) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    let mut push = |tag: &str| {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    };

    if contains_any(msg, &INITIAL_PHRASES)
        || contains_any(msg, &ARCHITECTURE_KEYWORDS)
        || any_path_contains(paths, &ARCHITECTURE_PATH_HINTS)
    {
        push("setup");
    }
    if contains_any(msg, &FEATURE_KEYWORDS) {
        push("feature");
    }
    if contains_any(msg, &BUGFIX_KEYWORDS) {
        push("bugfix");
    }
    if msg.contains("doc") || msg.contains("readme") || has_docs_file(paths) {
        push("documentation");
    }
    if msg.contains("config") || has_config_file(paths) {
        push("configuration");
    }
    if msg.contains("test") || any_path_contains(paths, &["test", "spec"]) {
        push("testing");
    }
    if contains_any(msg, &REFACTOR_KEYWORDS) {
        push("refactoring");
    }

    if config.forge_tags {
        if any_path_contains(paths, &["api", "endpoint"]) {
            push("api");
        }
        if any_path_contains(paths, &["ui", "component"]) {
            push("ui");
        }
    }

    if tags.is_empty() {
        tags.push("general".to_string());
    }
    tags
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

fn any_path_contains(paths: &[String], needles: &[&str]) -> bool {
    paths
        .iter()
        .any(|path| needles.iter().any(|needle| path.contains(needle)))
}

fn has_docs_file(paths: &[String]) -> bool {
    paths.iter().any(|path| {
        path.contains("readme") || path.ends_with(".md") || path.ends_with(".markdown")
    })
}

fn has_config_file(paths: &[String]) -> bool {
    paths.iter().any(|path| {
        let name = path.rsplit('/').next().unwrap_or(path);
        MANIFEST_FILES.contains(&name) || path.contains("config")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_FILES: [&str; 0] = [];

    #[test]
    fn fix_messages_classify_as_bugfix() {
        let result = classify("Fix timeline rendering bug", &NO_FILES, &ClassifierConfig::local());
        assert_eq!(result.category, Category::Bugfix);
        assert_eq!(result.importance, Importance::Medium);
        assert_eq!(result.structural_label(), "bug-fix");
    }

    #[test]
    fn docker_paths_force_architecture_regardless_of_message() {
        let result = classify(
            "small tweak",
            &["deploy/dockerfile"],
            &ClassifierConfig::local(),
        );
        assert_eq!(result.category, Category::Architecture);

        // "initial commit" outranks every file-based trigger
        let initial = classify(
            "Initial commit",
            &["deploy/dockerfile"],
            &ClassifierConfig::local(),
        );
        assert_eq!(initial.category, Category::Initial);
    }

    #[test]
    fn classification_is_deterministic() {
        let files = ["src/api/users.ts", "src/ui/App.tsx"];
        let first = classify("feat: wire up users", &files, &ClassifierConfig::remote());
        let second = classify("feat: wire up users", &files, &ClassifierConfig::remote());
        assert_eq!(first, second);
    }

    #[test]
    fn feature_scenario_includes_feature_tag() {
        let result = classify(
            "feat: add timeline component",
            &["client/timeline.tsx"],
            &ClassifierConfig::local(),
        );
        assert_eq!(result.category, Category::Feature);
        assert_eq!(result.importance, Importance::High);
        assert_eq!(result.structural_label(), "major-feature");
        assert!(result.tags.iter().any(|t| t == "feature"));
    }

    #[test]
    fn sixteen_files_exceed_the_bulk_architecture_threshold() {
        let files: Vec<String> = (0..16).map(|i| format!("src/file_{i}.rs")).collect();
        let result = classify("zzz", &files, &ClassifierConfig::local());
        assert_eq!(result.category, Category::Architecture);

        // The remote policy carries no threshold, so the same change list
        // falls through to the generic default.
        let remote = classify("zzz", &files, &ClassifierConfig::remote());
        assert_eq!(remote.category, Category::Feature);
        assert_eq!(remote.importance, Importance::Low);
    }

    #[test]
    fn nine_files_exceed_the_bulk_feature_threshold() {
        let files: Vec<String> = (0..9).map(|i| format!("src/file_{i}.rs")).collect();
        let result = classify("zzz", &files, &ClassifierConfig::local());
        assert_eq!(result.category, Category::Feature);
        assert_eq!(result.importance, Importance::High);
    }

    #[test]
    fn empty_message_and_files_fall_back_to_general() {
        let result = classify("", &NO_FILES, &ClassifierConfig::local());
        assert_eq!(result.category, Category::Feature);
        assert_eq!(result.importance, Importance::Low);
        assert_eq!(result.tags, vec!["general".to_string()]);
        assert_eq!(result.structural_label(), "minor-feature");
    }

    #[test]
    fn remote_fallback_projects_to_feature_label() {
        let result = classify("zzz", &NO_FILES, &ClassifierConfig::remote());
        assert_eq!(result.category.as_str(), "feature");
        assert_eq!(result.importance, Importance::Low);
    }

    #[test]
    fn tags_collapse_duplicates() {
        let result = classify("fix bug error issue", &NO_FILES, &ClassifierConfig::local());
        assert_eq!(
            result.tags.iter().filter(|t| t.as_str() == "bugfix").count(),
            1
        );
    }

    #[test]
    fn forge_tags_only_apply_on_the_remote_path() {
        let files = ["server/api/routes.ts", "client/components/Button.tsx"];

        let remote = classify("feat: new routes", &files, &ClassifierConfig::remote());
        assert!(remote.tags.iter().any(|t| t == "api"));
        assert!(remote.tags.iter().any(|t| t == "ui"));

        let local = classify("feat: new routes", &files, &ClassifierConfig::local());
        assert!(!local.tags.iter().any(|t| t == "api"));
        assert!(!local.tags.iter().any(|t| t == "ui"));
    }

    #[test]
    fn tag_accrual_is_independent_of_category_priority() {
        // Category resolves to feature (higher priority), but the bugfix
        // keyword still contributes its tag.
        let result = classify("add fix for login", &NO_FILES, &ClassifierConfig::local());
        assert_eq!(result.category, Category::Feature);
        assert!(result.tags.iter().any(|t| t == "feature"));
        assert!(result.tags.iter().any(|t| t == "bugfix"));
    }

    #[test]
    fn readme_files_classify_as_docs() {
        let result = classify("touch up", &["README.md"], &ClassifierConfig::local());
        assert_eq!(result.category, Category::Docs);
        assert_eq!(result.importance, Importance::Low);
    }

    #[test]
    fn manifest_files_classify_as_config() {
        let result = classify("bump deps", &["package.json"], &ClassifierConfig::remote());
        assert_eq!(result.category, Category::Config);
        assert!(result.tags.iter().any(|t| t == "configuration"));
    }

    #[test]
    fn config_paths_hit_the_architecture_path_hint_first() {
        // "config" appears in both the architecture path hints and the
        // config rule; priority order resolves it to architecture.
        let result = classify("zzz", &["config/app.yaml"], &ClassifierConfig::local());
        assert_eq!(result.category, Category::Architecture);
    }
}
