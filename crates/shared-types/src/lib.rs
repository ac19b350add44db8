pub mod types;

pub use types::{ComplianceReport, FavoredParty, Issue, IssueType, Severity};
