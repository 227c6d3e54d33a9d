//! # Data Loader Crate
//!
//! This crate loads the activity catalog, stored user profiles and the
//! append-only interaction log.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Activity, InteractionEvent, UserProfile, Dataset)
//! - **parser**: Parse the CSV files into Rust structs
//! - **index**: Build the catalog index and validate it
//! - **interactions**: Append-only interaction log with per-user seen sets
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{Dataset, InteractionLog};
//! use std::path::Path;
//!
//! let dataset = Dataset::load_from_files(Path::new("data"))?;
//! let log = InteractionLog::open("data/interactions.csv")?;
//!
//! let activity = dataset.get_activity("a1").unwrap();
//! let seen = log.seen_by("u1");
//! ```

// Public modules
pub mod error;
pub mod index;
pub mod interactions;
pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use index::{ACTIVITIES_FILE, INTERACTIONS_FILE, USERS_FILE};
pub use interactions::InteractionLog;
pub use types::{
    // Type aliases
    ActivityId,
    UserId,
    // Core types
    Activity,
    Dataset,
    EventKind,
    InteractionEvent,
    UserProfile,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn activity(id: &str, tags: &str, city: Option<&str>) -> Activity {
        Activity {
            id: id.to_string(),
            title: format!("Activity {}", id),
            tags: tags.to_string(),
            city: city.map(str::to_string),
        }
    }

    #[test]
    fn test_dataset_creation() {
        let dataset = Dataset::new();
        assert_eq!(dataset.counts(), (0, 0));
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_insert_activity_keeps_order() {
        let mut dataset = Dataset::new();
        dataset.insert_activity(activity("a2", "yoga", None)).unwrap();
        dataset.insert_activity(activity("a1", "hiking", None)).unwrap();

        assert_eq!(dataset.activity_position("a2"), Some(0));
        assert_eq!(dataset.activity_position("a1"), Some(1));
        assert_eq!(dataset.activities()[1].id, "a1");
    }

    #[test]
    fn test_document_text() {
        let a = Activity {
            id: "a1".to_string(),
            title: "Morning Hike".to_string(),
            tags: "Hiking;Outdoor".to_string(),
            city: None,
        };
        assert_eq!(a.document_text(), "morning hike hiking outdoor");
    }

    #[test]
    fn test_city_match_is_case_insensitive() {
        let a = activity("a1", "hiking", Some("NYC"));
        assert!(a.in_city("nyc"));
        assert!(a.in_city(" NYC "));
        assert!(!a.in_city("Boston"));
        assert!(!activity("a2", "yoga", None).in_city("nyc"));
    }

    #[test]
    fn test_event_kind_parsing() {
        assert_eq!("Rate".parse::<EventKind>().unwrap(), EventKind::Rate);
        assert!("share".parse::<EventKind>().is_err());
    }

    #[test]
    fn test_event_weight() {
        let view = InteractionEvent::new("u1", "a1", EventKind::View);
        assert_eq!(view.weight(), 1.0);
        let rated = InteractionEvent::new("u1", "a1", EventKind::Rate).with_rating(4);
        assert_eq!(rated.weight(), 4.0);
    }

    #[test]
    fn test_empty_queries() {
        let dataset = Dataset::new();
        assert!(dataset.get_activity("missing").is_none());
        assert!(dataset.get_profile("missing").is_none());
    }
}
