//! Dataset building and indexing logic.
//!
//! Loads the catalog and the optional user profiles from a data directory,
//! builds the ID -> row index and validates the result.

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use std::path::Path;
use tracing::{debug, info, warn};

/// File names inside the data directory
pub const ACTIVITIES_FILE: &str = "activities.csv";
pub const INTERACTIONS_FILE: &str = "interactions.csv";
pub const USERS_FILE: &str = "users.csv";

impl Dataset {
    /// Load the catalog and user profiles from a directory
    ///
    /// Steps:
    /// 1. Parse activities.csv and users.csv in parallel
    /// 2. Build the activity index in file order
    /// 3. Insert profiles (users.csv is optional)
    /// 4. Validate
    pub fn load_from_files(data_dir: &Path) -> Result<Self> {
        info!("Loading activity catalog from {:?}", data_dir);

        let activities_path = data_dir.join(ACTIVITIES_FILE);
        let users_path = data_dir.join(USERS_FILE);

        let (activities, profiles) = rayon::join(
            || parser::parse_activities(&activities_path),
            || {
                if users_path.exists() {
                    parser::parse_profiles(&users_path).map(Some)
                } else {
                    Ok(None)
                }
            },
        );

        let activities = activities?;
        let profiles = profiles?;

        let mut dataset = Dataset::from_activities(activities)?;
        match profiles {
            Some(profiles) => {
                for profile in profiles {
                    dataset.insert_profile(profile);
                }
            }
            None => warn!("No {} found, every user starts cold", USERS_FILE),
        }

        dataset.validate()?;

        let (activities, profiles) = dataset.counts();
        info!("Loaded {} activities, {} user profiles", activities, profiles);
        Ok(dataset)
    }

    /// Stored profiles only (users.csv), for when the catalog itself comes
    /// from elsewhere. A missing file yields no profiles.
    pub fn load_profiles(data_dir: &Path) -> Result<Vec<UserProfile>> {
        let users_path = data_dir.join(USERS_FILE);
        if !users_path.exists() {
            warn!("No {} found, every user starts cold", USERS_FILE);
            return Ok(Vec::new());
        }
        let profiles = parser::parse_profiles(&users_path)?;
        debug!("Loaded {} user profiles", profiles.len());
        Ok(profiles)
    }

    /// Validate data integrity
    ///
    /// Check that:
    /// - the catalog is not empty
    /// - every activity has a non-blank ID
    pub fn validate(&self) -> Result<()> {
        if self.activities.is_empty() {
            return Err(DataLoadError::ValidationError(
                "activity catalog is empty".to_string(),
            ));
        }
        for (row, activity) in self.activities.iter().enumerate() {
            if activity.id.trim().is_empty() {
                return Err(DataLoadError::InvalidValue {
                    field: "activity_id".to_string(),
                    value: format!("<blank> at row {}", row),
                });
            }
            debug_assert_eq!(self.activity_index.get(&activity.id), Some(&row));
        }
        debug!("Catalog validated ({} rows)", self.activities.len());
        Ok(())
    }
}
