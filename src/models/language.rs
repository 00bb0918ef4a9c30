//! Language model
//!
//! Languages carry an ISO code stored lowercase and unique
//! case-insensitively. English is seeded by migration and is the one entry
//! that can never be deleted.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Audit;

/// ISO code of the protected anchor language
pub const ENGLISH_CODE: &str = "en";

/// Language entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Language {
    /// Unique identifier
    pub id: String,
    /// Display name, e.g. "English"
    pub name: String,
    /// ISO code, stored lowercase
    pub code: String,
    /// Whether the language is available for new content
    pub is_active: bool,
    /// Audit metadata
    #[serde(flatten)]
    pub audit: Audit,
}

impl Language {
    /// Create a new language stamped with the creating actor.
    /// The code is normalized to lowercase.
    pub fn new(input: CreateLanguageInput, actor: Option<&str>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            code: input.code.trim().to_lowercase(),
            is_active: input.is_active,
            audit: Audit::track_creation(actor),
        }
    }

    /// Whether this is the seeded English entry
    pub fn is_english(&self) -> bool {
        self.code == ENGLISH_CODE
    }

    /// English can never be deleted
    pub fn can_be_deleted(&self) -> bool {
        !self.is_english()
    }

    /// Apply a partial update, keeping the code lowercase
    pub fn apply_update(&mut self, input: &UpdateLanguageInput, actor: Option<&str>) {
        if let Some(name) = &input.name {
            if !name.trim().is_empty() {
                self.name = name.clone();
            }
        }
        if let Some(code) = &input.code {
            let code = code.trim().to_lowercase();
            if !code.is_empty() {
                self.code = code;
            }
        }
        if let Some(is_active) = input.is_active {
            self.is_active = is_active;
        }
        self.audit.track_update(actor);
    }
}

/// Input for creating a language
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLanguageInput {
    /// Display name
    pub name: String,
    /// ISO code (any case, normalized on create)
    pub code: String,
    /// Whether the language is active (defaults to true)
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Input for partially updating a language
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateLanguageInput {
    /// New display name (optional)
    pub name: Option<String>,
    /// New ISO code (optional)
    pub code: Option<String>,
    /// New active flag (optional)
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_language_lowercases_code() {
        let language = Language::new(
            CreateLanguageInput {
                name: "German".to_string(),
                code: " DE ".to_string(),
                is_active: true,
            },
            None,
        );
        assert_eq!(language.code, "de");
    }

    #[test]
    fn test_english_cannot_be_deleted() {
        let english = Language::new(
            CreateLanguageInput {
                name: "English".to_string(),
                code: "EN".to_string(),
                is_active: true,
            },
            None,
        );
        assert!(english.is_english());
        assert!(!english.can_be_deleted());
    }

    #[test]
    fn test_other_languages_can_be_deleted() {
        let spanish = Language::new(
            CreateLanguageInput {
                name: "Spanish".to_string(),
                code: "es".to_string(),
                is_active: true,
            },
            None,
        );
        assert!(!spanish.is_english());
        assert!(spanish.can_be_deleted());
    }

    #[test]
    fn test_apply_update_normalizes_code() {
        let mut language = Language::new(
            CreateLanguageInput {
                name: "French".to_string(),
                code: "fr".to_string(),
                is_active: true,
            },
            None,
        );

        language.apply_update(
            &UpdateLanguageInput {
                code: Some("FR-CA".to_string()),
                is_active: Some(false),
                ..Default::default()
            },
            Some("admin-1"),
        );

        assert_eq!(language.code, "fr-ca");
        assert!(!language.is_active);
        assert_eq!(language.audit.updated_by_user_id.as_deref(), Some("admin-1"));
    }
}
