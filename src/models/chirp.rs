//! Chirp domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

/// Maximum chirp length in bytes of UTF-8
pub const MAX_CHIRP_LENGTH: usize = 140;

const PROFANE_WORDS: &[&str] = &["kerfuffle", "sharbert", "fornax"];

/// A chirp; `user_id` is fixed at creation and drives the ownership check
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Chirp {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: String,
    pub user_id: Uuid,
}

/// Create chirp request
#[derive(Debug, Deserialize)]
pub struct CreateChirpRequest {
    pub body: String,
}

// `length` in validator counts chars; the limit is on encoded bytes.
impl Validate for CreateChirpRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        if self.body.len() <= MAX_CHIRP_LENGTH {
            return Ok(());
        }

        let mut error = ValidationError::new("length");
        error.message = Some("Chirp is too long".into());

        let mut errors = ValidationErrors::new();
        errors.add("body", error);
        Err(errors)
    }
}

/// Sort direction for chirp listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Query string of `GET /api/chirps`
#[derive(Debug, Default, Deserialize)]
pub struct ChirpListQuery {
    pub author_id: Option<Uuid>,
    #[serde(default)]
    pub sort: SortOrder,
}

/// Replace profane words with `****`; words are split on single spaces
pub fn clean_body(body: &str) -> String {
    body.split(' ')
        .map(|word| {
            if PROFANE_WORDS.contains(&word.to_lowercase().as_str()) {
                "****"
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_body_replaces_profanity() {
        assert_eq!(
            clean_body("This is a kerfuffle opinion I need to share with the world"),
            "This is a **** opinion I need to share with the world"
        );
        assert_eq!(clean_body("Sharbert! is fine"), "Sharbert! is fine");
        assert_eq!(clean_body("FORNAX rules"), "**** rules");
    }

    #[test]
    fn test_clean_body_keeps_spacing() {
        assert_eq!(clean_body("a  kerfuffle"), "a  ****");
        assert_eq!(clean_body(""), "");
    }

    #[test]
    fn test_length_limit() {
        let ok = CreateChirpRequest {
            body: "a".repeat(MAX_CHIRP_LENGTH),
        };
        assert!(ok.validate().is_ok());

        let too_long = CreateChirpRequest {
            body: "a".repeat(MAX_CHIRP_LENGTH + 1),
        };
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn test_length_limit_counts_bytes() {
        // 'é' is two bytes in UTF-8
        let fits = CreateChirpRequest {
            body: "é".repeat(MAX_CHIRP_LENGTH / 2),
        };
        assert!(fits.validate().is_ok());

        let over = CreateChirpRequest {
            body: "é".repeat(MAX_CHIRP_LENGTH / 2 + 1),
        };
        assert_eq!(over.body.chars().count(), 71);
        let errors = over.validate().unwrap_err();
        assert!(errors.to_string().contains("Chirp is too long"));
    }
}
