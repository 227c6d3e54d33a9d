//! Core domain types for the activity catalog.
//!
//! This module defines the fundamental data structures used throughout the system:
//! activities, user profiles and logged interaction events, plus the
//! [`Dataset`] that owns the catalog in its canonical row order.

use crate::error::{DataLoadError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Type Aliases
// =============================================================================

/// Identifier of a user (free-form string, 1-64 chars at the API boundary)
pub type UserId = String;

/// Identifier of an activity (unique within the catalog)
pub type ActivityId = String;

// =============================================================================
// Activity
// =============================================================================

/// One entry of the activity catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub title: String,
    /// Keyword list, `;`- or space-delimited (e.g. "hiking;outdoor")
    pub tags: String,
    pub city: Option<String>,
}

impl Activity {
    /// Text the content vectorizer indexes for this activity:
    /// title and tags, lowercased, with `;` separators turned into spaces.
    pub fn document_text(&self) -> String {
        format!("{} {}", self.title, self.tags.replace(';', " ")).to_lowercase()
    }

    /// Lowercased tag string used for substring matching.
    pub fn tags_lower(&self) -> String {
        self.tags.to_lowercase()
    }

    /// Case-insensitive exact match against the activity's city.
    ///
    /// An activity without a city never matches.
    pub fn in_city(&self, city: &str) -> bool {
        match &self.city {
            Some(c) => c.trim().to_lowercase() == city.trim().to_lowercase(),
            None => false,
        }
    }
}

// =============================================================================
// Interaction events
// =============================================================================

/// Kind of a logged interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    #[default]
    View,
    Click,
    Like,
    Rate,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::View => "view",
            EventKind::Click => "click",
            EventKind::Like => "like",
            EventKind::Rate => "rate",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = DataLoadError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "view" => Ok(EventKind::View),
            "click" => Ok(EventKind::Click),
            "like" => Ok(EventKind::Like),
            "rate" => Ok(EventKind::Rate),
            _ => Err(DataLoadError::InvalidValue {
                field: "event".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// A single user-activity interaction from the append-only log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub user_id: UserId,
    pub activity_id: ActivityId,
    pub event: EventKind,
    /// 1-5, required when `event` is `rate`
    pub rating: Option<u8>,
    /// Implicit feedback strength from imported logs that carry a `liked`
    /// column. Never written by [`crate::InteractionLog::append`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liked: Option<f32>,
}

impl InteractionEvent {
    pub fn new(user_id: impl Into<UserId>, activity_id: impl Into<ActivityId>, event: EventKind) -> Self {
        Self {
            user_id: user_id.into(),
            activity_id: activity_id.into(),
            event,
            rating: None,
            liked: None,
        }
    }

    pub fn with_rating(mut self, rating: u8) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Value this event contributes to the user-item matrix:
    /// the rating when present, then the `liked` value, otherwise 1.
    pub fn weight(&self) -> f32 {
        self.rating
            .map(f32::from)
            .or(self.liked)
            .unwrap_or(1.0)
    }

    /// Check the event invariants before it is persisted.
    pub fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            return Err(DataLoadError::ValidationError("user_id must not be empty".to_string()));
        }
        if self.activity_id.trim().is_empty() {
            return Err(DataLoadError::ValidationError(
                "activity_id must not be empty".to_string(),
            ));
        }
        if let Some(rating) = self.rating {
            if !(1..=5).contains(&rating) {
                return Err(DataLoadError::InvalidValue {
                    field: "rating".to_string(),
                    value: rating.to_string(),
                });
            }
        }
        if self.event == EventKind::Rate && self.rating.is_none() {
            return Err(DataLoadError::ValidationError(
                "Rating must be provided when event is 'rate'".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// User profiles
// =============================================================================

/// Stored interests of a known user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    /// `;`- or space-delimited interest keywords
    pub interests: String,
}

impl UserProfile {
    /// Interests as free text for the content scorer.
    pub fn profile_text(&self) -> String {
        self.interests.replace(';', " ").to_lowercase()
    }
}

// =============================================================================
// Dataset - the in-memory catalog
// =============================================================================

/// Holds the activity catalog in row order plus stored user profiles.
///
/// Row order matters: content vectors and score vectors are aligned with
/// [`Dataset::activities`].
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub(crate) activities: Vec<Activity>,
    pub(crate) activity_index: HashMap<ActivityId, usize>,
    pub(crate) profiles: HashMap<UserId, UserProfile>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dataset from an ordered list of activities.
    pub fn from_activities(activities: Vec<Activity>) -> Result<Self> {
        let mut dataset = Self::new();
        for activity in activities {
            dataset.insert_activity(activity)?;
        }
        Ok(dataset)
    }

    /// Get an activity by ID
    pub fn get_activity(&self, id: &str) -> Option<&Activity> {
        self.activity_index.get(id).map(|&row| &self.activities[row])
    }

    /// Row of an activity in catalog order
    pub fn activity_position(&self, id: &str) -> Option<usize> {
        self.activity_index.get(id).copied()
    }

    /// All activities in catalog order
    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn get_profile(&self, user_id: &str) -> Option<&UserProfile> {
        self.profiles.get(user_id)
    }

    /// Append an activity to the end of the catalog.
    ///
    /// Duplicate IDs are rejected so that the ID -> row map stays a bijection.
    pub fn insert_activity(&mut self, activity: Activity) -> Result<()> {
        if self.activity_index.contains_key(&activity.id) {
            return Err(DataLoadError::ValidationError(format!(
                "duplicate activity_id {}",
                activity.id
            )));
        }
        self.activity_index
            .insert(activity.id.clone(), self.activities.len());
        self.activities.push(activity);
        Ok(())
    }

    /// Insert or replace a stored profile
    pub fn insert_profile(&mut self, profile: UserProfile) {
        self.profiles.insert(profile.user_id.clone(), profile);
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    /// Get counts for debugging/validation: (activities, profiles)
    pub fn counts(&self) -> (usize, usize) {
        (self.activities.len(), self.profiles.len())
    }
}
