//! Audit metadata shared by persisted entities
//!
//! Every mutation stamps who changed the row and when. The actor is the id
//! of the authenticated user, or `None` for seed data and anonymous paths.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Creation/update timestamps and actor ids carried by audited entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Audit {
    /// When the entity was created
    pub created_at: DateTime<Utc>,
    /// When the entity was last updated, if ever
    pub updated_at: Option<DateTime<Utc>>,
    /// Id of the user who created the entity
    pub created_by_user_id: Option<String>,
    /// Id of the user who performed the last update
    pub updated_by_user_id: Option<String>,
}

impl Audit {
    /// Fresh audit block stamped with the creating actor
    pub fn track_creation(actor: Option<&str>) -> Self {
        Self {
            created_at: Utc::now(),
            updated_at: None,
            created_by_user_id: actor.map(str::to_string),
            updated_by_user_id: None,
        }
    }

    /// Stamp an update by the given actor
    pub fn track_update(&mut self, actor: Option<&str>) {
        self.updated_at = Some(Utc::now());
        self.updated_by_user_id = actor.map(str::to_string);
    }
}

impl Default for Audit {
    fn default() -> Self {
        Self::track_creation(None)
    }
}
