use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;

use grams_types::api::{FieldError, GramFields, GramParams};
use grams_types::models::Gram;

/// 10 MB upload limit for pictures, measured after base64 decoding.
pub const MAX_PICTURE_SIZE: usize = 10 * 1024 * 1024;

/// A create or update body as it arrived.
///
/// Decoding errors are carried instead of rejected so they surface as a
/// validation failure, after the request has been authorized.
#[derive(Debug, Clone)]
pub enum Submission {
    Fields(GramFields),
    Malformed(String),
}

impl Submission {
    /// Accepts `{"gram": {...}}`, bare fields, or an empty body.
    pub fn parse(body: &[u8]) -> Self {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Self::Fields(GramFields::default());
        }
        match serde_json::from_slice::<GramParams>(body) {
            Ok(params) => Self::Fields(params.into_fields()),
            Err(e) => Self::Malformed(e.to_string()),
        }
    }

    pub fn into_fields(self) -> Result<GramFields, Vec<FieldError>> {
        match self {
            Self::Fields(fields) => Ok(fields),
            Self::Malformed(reason) => Err(vec![FieldError {
                field: "gram",
                message: format!("is not a valid JSON gram: {}", reason),
            }]),
        }
    }
}

impl From<GramFields> for Submission {
    fn from(fields: GramFields) -> Self {
        Self::Fields(fields)
    }
}

impl From<&GramFields> for Submission {
    fn from(fields: &GramFields) -> Self {
        Self::Fields(fields.clone())
    }
}

/// Fields that passed validation and are ready to be written.
///
/// On update `picture: None` leaves the stored picture in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GramChanges {
    pub message: String,
    pub picture: Option<Vec<u8>>,
}

/// Validate fields for a new gram. A missing message counts as blank.
pub fn validate_new(fields: &GramFields) -> Result<GramChanges, Vec<FieldError>> {
    let mut errors = Vec::new();

    let message = fields.message.clone().unwrap_or_default();
    check_message(&message, &mut errors);
    let picture = decode_picture(fields.picture.as_deref(), &mut errors);

    if errors.is_empty() {
        Ok(GramChanges { message, picture })
    } else {
        Err(errors)
    }
}

/// Validate fields applied on top of an existing gram. Absent fields keep
/// the stored value.
pub fn validate_changes(
    existing: &Gram,
    fields: &GramFields,
) -> Result<GramChanges, Vec<FieldError>> {
    let mut errors = Vec::new();

    let message = fields
        .message
        .clone()
        .unwrap_or_else(|| existing.message.clone());
    check_message(&message, &mut errors);

    let picture = decode_picture(fields.picture.as_deref(), &mut errors);

    if errors.is_empty() {
        Ok(GramChanges { message, picture })
    } else {
        Err(errors)
    }
}

fn check_message(message: &str, errors: &mut Vec<FieldError>) {
    if message.trim().is_empty() {
        errors.push(FieldError {
            field: "message",
            message: "can't be blank".into(),
        });
    }
}

fn decode_picture(encoded: Option<&str>, errors: &mut Vec<FieldError>) -> Option<Vec<u8>> {
    let encoded = encoded?;
    let bytes = match B64.decode(encoded) {
        Ok(bytes) => bytes,
        Err(_) => {
            errors.push(FieldError {
                field: "picture",
                message: "is not valid base64".into(),
            });
            return None;
        }
    };

    if bytes.is_empty() {
        errors.push(FieldError {
            field: "picture",
            message: "is empty".into(),
        });
        return None;
    }
    if bytes.len() > MAX_PICTURE_SIZE {
        errors.push(FieldError {
            field: "picture",
            message: format!("exceeds {} bytes", MAX_PICTURE_SIZE),
        });
        return None;
    }

    Some(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn stored(message: &str, picture: Option<Vec<u8>>) -> Gram {
        Gram {
            id: Uuid::new_v4(),
            message: message.into(),
            picture,
            owner_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn blank_and_whitespace_messages_are_rejected() {
        for message in ["", "   ", "\n\t"] {
            let errors = validate_new(&GramFields::message(message)).unwrap_err();
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].field, "message");
        }
        assert!(validate_new(&GramFields::default()).is_err());
    }

    #[test]
    fn message_is_kept_verbatim() {
        let changes = validate_new(&GramFields::message("  Test Gram!  ")).unwrap();
        assert_eq!(changes.message, "  Test Gram!  ");
        assert!(changes.picture.is_none());
    }

    #[test]
    fn picture_is_decoded() {
        let fields = GramFields {
            message: Some("with a picture".into()),
            picture: Some(B64.encode(b"\x89PNG")),
        };
        let changes = validate_new(&fields).unwrap();
        assert_eq!(changes.picture.as_deref(), Some(&b"\x89PNG"[..]));
    }

    #[test]
    fn every_failing_field_is_reported() {
        let fields = GramFields {
            message: Some(String::new()),
            picture: Some("not base64!!".into()),
        };
        let errors = validate_new(&fields).unwrap_err();
        let names: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(names, vec!["message", "picture"]);
    }

    #[test]
    fn oversized_picture_is_rejected() {
        let fields = GramFields {
            message: Some("big".into()),
            picture: Some(B64.encode(vec![0u8; MAX_PICTURE_SIZE + 1])),
        };
        let errors = validate_new(&fields).unwrap_err();
        assert_eq!(errors[0].field, "picture");
    }

    #[test]
    fn absent_fields_keep_stored_values() {
        let existing = stored("Initial value", Some(vec![1, 2, 3]));
        let changes = validate_changes(&existing, &GramFields::default()).unwrap();
        assert_eq!(changes.message, "Initial value");
        assert!(changes.picture.is_none());

        let changes = validate_changes(&existing, &GramFields::message("changed value")).unwrap();
        assert_eq!(changes.message, "changed value");
        assert!(changes.picture.is_none());

        let fields = GramFields {
            message: None,
            picture: Some(B64.encode([9u8, 9])),
        };
        let changes = validate_changes(&existing, &fields).unwrap();
        assert_eq!(changes.picture, Some(vec![9, 9]));
    }

    #[test]
    fn nested_and_flat_bodies_both_parse() {
        for body in [
            &br#"{"gram":{"message":"hi"}}"#[..],
            &br#"{"message":"hi"}"#[..],
        ] {
            let fields = Submission::parse(body).into_fields().unwrap();
            assert_eq!(fields.message.as_deref(), Some("hi"));
        }

        let fields = Submission::parse(b"  ").into_fields().unwrap();
        assert!(fields.message.is_none());
    }

    #[test]
    fn undecodable_bodies_become_field_errors() {
        for body in [&b"message=5"[..], br#"{"message":5}"#, br#"{"title":"x"}"#] {
            let errors = Submission::parse(body).into_fields().unwrap_err();
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].field, "gram");
        }
    }

    #[test]
    fn explicit_blank_message_fails_on_update() {
        let existing = stored("Initial value", None);
        let errors = validate_changes(&existing, &GramFields::message("")).unwrap_err();
        assert_eq!(errors[0].field, "message");
    }
}
