use super::commit::CommitRecord;
use serde::{Deserialize, Serialize};

/// Canonical commit category.
///
/// The onboarding view serializes these names directly; the local listing
/// projects them onto the five-way structural taxonomy via
/// [`Classification::structural_label`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Initial,
    Architecture,
    Feature,
    Bugfix,
    Docs,
    Config,
    Test,
    Refactor,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Initial => "initial",
            Category::Architecture => "architecture",
            Category::Feature => "feature",
            Category::Bugfix => "bugfix",
            Category::Docs => "docs",
            Category::Config => "config",
            Category::Test => "test",
            Category::Refactor => "refactor",
        }
    }

    pub fn parse(value: &str) -> Option<Category> {
        match value {
            "initial" => Some(Category::Initial),
            "architecture" => Some(Category::Architecture),
            "feature" => Some(Category::Feature),
            "bugfix" => Some(Category::Bugfix),
            "docs" => Some(Category::Docs),
            "config" => Some(Category::Config),
            "test" => Some(Category::Test),
            "refactor" => Some(Category::Refactor),
            _ => None,
        }
    }

    /// Importance assigned when the category was matched by a rule.
    /// The generic fallback overrides this to `Low`.
    pub fn default_importance(&self) -> Importance {
        match self {
            Category::Initial | Category::Architecture | Category::Feature => Importance::High,
            Category::Bugfix | Category::Config | Category::Test => Importance::Medium,
            Category::Docs | Category::Refactor => Importance::Low,
        }
    }
}

/// Ordinal importance, high to low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    High,
    Medium,
    Low,
}

impl Importance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Importance::High => "high",
            Importance::Medium => "medium",
            Importance::Low => "low",
        }
    }

    pub fn parse(value: &str) -> Option<Importance> {
        match value {
            "high" => Some(Importance::High),
            "medium" => Some(Importance::Medium),
            "low" => Some(Importance::Low),
            _ => None,
        }
    }
}

/// Derived category/importance/tags attached to a commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub category: Category,
    pub importance: Importance,
    pub tags: Vec<String>,
}

impl Classification {
    /// Five-way structural label used by the local listing contract.
    ///
    /// `Feature` splits on importance: high-importance matches are
    /// `major-feature`, everything else (including the generic fallback,
    /// which forces importance to low) is `minor-feature`.
    pub fn structural_label(&self) -> &'static str {
        match self.category {
            Category::Initial | Category::Architecture => "architecture",
            Category::Feature if self.importance == Importance::High => "major-feature",
            Category::Feature => "minor-feature",
            Category::Bugfix => "bug-fix",
            Category::Refactor => "refactor",
            Category::Docs | Category::Config | Category::Test => "minor-feature",
        }
    }
}

/// A commit with its derived classification attached. Serializes flat, the
/// shape the timeline consumer reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedCommit {
    #[serde(flatten)]
    pub commit: CommitRecord,
    #[serde(flatten)]
    pub classification: Classification,
}

/// The local listing view: same record, structural category label.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralCommit {
    #[serde(flatten)]
    pub commit: CommitRecord,
    pub category: &'static str,
    pub importance: Importance,
    pub tags: Vec<String>,
}

impl From<ClassifiedCommit> for StructuralCommit {
    fn from(classified: ClassifiedCommit) -> Self {
        let category = classified.classification.structural_label();
        StructuralCommit {
            commit: classified.commit,
            category,
            importance: classified.classification.importance,
            tags: classified.classification.tags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels_round_trip() {
        for category in [
            Category::Initial,
            Category::Architecture,
            Category::Feature,
            Category::Bugfix,
            Category::Docs,
            Category::Config,
            Category::Test,
            Category::Refactor,
        ] {
            assert_eq!(Category::parse(category.as_str()), Some(category));
        }
        assert_eq!(Category::parse("chore"), None);
    }

    #[test]
    fn structural_projection_splits_feature_on_importance() {
        let high = Classification {
            category: Category::Feature,
            importance: Importance::High,
            tags: vec![],
        };
        let low = Classification {
            category: Category::Feature,
            importance: Importance::Low,
            tags: vec![],
        };

        assert_eq!(high.structural_label(), "major-feature");
        assert_eq!(low.structural_label(), "minor-feature");
    }

    #[test]
    fn structural_projection_folds_setup_categories_into_architecture() {
        for category in [Category::Initial, Category::Architecture] {
            let classification = Classification {
                category,
                importance: category.default_importance(),
                tags: vec![],
            };
            assert_eq!(classification.structural_label(), "architecture");
        }
    }
}
