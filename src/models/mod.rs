pub mod classification;
pub mod commit;
pub mod insights;
pub mod repository;

pub use classification::{Category, Classification, ClassifiedCommit, Importance, StructuralCommit};
pub use commit::{Author, ChangeKind, CommitRecord, CommitStats, FileChange};
pub use insights::{
    ContributorProfile, ExpertContact, FocusArea, OnboardingNarrative, RecentActivity,
    TimelineInsights,
};
pub use repository::{Pagination, RepoMeta, RepoRecord, RepoStatus, TimelinePage};
