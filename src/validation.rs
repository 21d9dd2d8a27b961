//! Field rules for owner payloads.
//!
//! Request bodies derive [`validator::Validate`]; this module holds the
//! bounds they share, the custom rules the derive cannot express, and the
//! flattening of nested errors into the `owner.email: ...` form clients see.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

pub const PHONE_MIN: i64 = 1_000_000_000;
pub const PHONE_MAX: i64 = 9_999_999_999;
pub const PINCODE_MIN: i64 = 100_000;
pub const PINCODE_MAX: i64 = 999_999;
pub const PASSWORD_MIN_LEN: u64 = 8;
pub const PASSWORD_MAX_LEN: u64 = 16;
pub const EMAIL_MAX_LEN: u64 = 64;
pub const MINIMUM_AGE_YEARS: i64 = 18;

/// Key used for struct-level rules such as "at least one field".
pub const SCHEMA_FIELD: &str = "_schema";

const GENDERS: [&str; 3] = ["male", "female", "other"];

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

pub fn gender(value: &str) -> Result<(), ValidationError> {
    if GENDERS.contains(&value.to_ascii_lowercase().as_str()) {
        Ok(())
    } else {
        Err(error(
            "gender",
            "Gender must be either 'male', 'female', or 'other'.",
        ))
    }
}

/// Whole years are counted as 365-day blocks.
pub fn is_adult(dob: &DateTime<Utc>, now: &DateTime<Utc>) -> bool {
    (*now - *dob).num_days() / 365 >= MINIMUM_AGE_YEARS
}

pub fn adult(dob: &DateTime<Utc>) -> Result<(), ValidationError> {
    if is_adult(dob, &Utc::now()) {
        Ok(())
    } else {
        Err(error("age", "Age must be greater than 18."))
    }
}

/// Struct-level failure for payloads where every field is optional but one
/// is required.
pub fn at_least_one(present: bool, message: &'static str) -> Result<(), ValidationError> {
    if present {
        Ok(())
    } else {
        Err(error("at_least_one", message))
    }
}

/// Flattens nested errors into sorted `path: message` pairs.
pub fn field_errors(errors: &ValidationErrors) -> Vec<(String, String)> {
    let mut out = Vec::new();
    collect(errors, "", &mut out);
    out.sort();
    out
}

fn collect(errors: &ValidationErrors, prefix: &str, out: &mut Vec<(String, String)>) {
    for (field, kind) in errors.errors() {
        let field = field.to_string();
        let field = if field == "__all__" {
            SCHEMA_FIELD.to_owned()
        } else {
            field
        };
        let path = if prefix.is_empty() {
            field
        } else {
            format!("{prefix}.{field}")
        };

        match kind {
            ValidationErrorsKind::Field(list) => {
                for err in list {
                    let message = err
                        .message
                        .as_ref()
                        .map_or_else(|| err.code.to_string(), |message| message.to_string());
                    out.push((path.clone(), message));
                }
            }
            ValidationErrorsKind::Struct(nested) => collect(nested, &path, out),
            ValidationErrorsKind::List(items) => {
                for (idx, nested) in items {
                    collect(nested, &format!("{path}[{idx}]"), out);
                }
            }
        }
    }
}

/// Renders errors as `owner.email: Not a valid email address.; ...`.
pub fn describe(errors: &ValidationErrors) -> String {
    field_errors(errors)
        .into_iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Lowercase hex SHA-256 of the raw password, the stored form.
pub fn hash_password(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}
