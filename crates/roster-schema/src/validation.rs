//! Draft validation
//!
//! Each field carries exactly one rule. Rules are evaluated independently and
//! every violation is collected, so a form can show all inline errors at once.
//! There are no cross-field rules.

use crate::draft::Draft;
use crate::field::Field;
use crate::record::{Gender, StudentPayload};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[a-z0-9_'+\-.]*[a-z0-9_+\-]@(?:[a-z0-9][a-z0-9\-]*\.)+[a-z]{2,}$")
        .expect("email pattern is valid")
});

/// Minimum pincode length
pub const PINCODE_MIN_LEN: usize = 6;
/// Minimum phone number length
pub const PHONE_MIN_LEN: usize = 10;

/// Rule attached to a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// At least one character
    NonEmpty,
    /// At least `n` characters; no format check
    MinLen(usize),
    /// Email syntax
    Email,
    /// One of the [`Gender`] values
    GenderEnum,
}

impl Rule {
    /// The rule a field is validated with
    #[must_use]
    pub fn for_field(field: Field) -> Self {
        match field {
            Field::Gender => Self::GenderEnum,
            Field::Pincode => Self::MinLen(PINCODE_MIN_LEN),
            Field::PhoneNumber => Self::MinLen(PHONE_MIN_LEN),
            Field::Email => Self::Email,
            _ => Self::NonEmpty,
        }
    }

    /// Check a raw value; `None` means the field was never filled in.
    ///
    /// Returns the message to show on failure.
    #[must_use]
    pub fn check(self, field: Field, value: Option<&str>) -> Option<&'static str> {
        let value = value.unwrap_or("");
        let ok = match self {
            Self::NonEmpty => !value.is_empty(),
            Self::MinLen(n) => value.chars().count() >= n,
            Self::Email => is_valid_email(value),
            Self::GenderEnum => {
                if value.is_empty() {
                    return Some(field.error_message());
                }
                if value.parse::<Gender>().is_err() {
                    return Some("Gender must be one of male, female, other");
                }
                true
            }
        };
        (!ok).then(|| field.error_message())
    }
}

/// Email syntax check
#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    !value.starts_with('.') && !value.contains("..") && EMAIL.is_match(value)
}

/// Field-level validation failures, in form order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(IndexMap<Field, String>);

impl FieldErrors {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for a field, replacing any earlier one
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// Message for a field, if it failed
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Failing fields with their messages
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }

    /// Failing fields only
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} field(s) invalid", self.0.len())?;
        for (i, (field, message)) in self.0.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{field}: {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// Validate a draft.
///
/// Total: never panics, and returns either a payload whose every field holds
/// or a non-empty set of field errors.
///
/// # Errors
/// Every field whose rule failed, with its message.
pub fn validate(draft: &Draft) -> Result<StudentPayload, FieldErrors> {
    let mut errors = FieldErrors::new();
    for field in Field::ALL {
        if let Some(message) = Rule::for_field(field).check(field, draft.get(field)) {
            errors.insert(field, message);
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    let text = |field: Field| draft.get(field).unwrap_or_default().to_string();
    let gender = draft
        .get(Field::Gender)
        .and_then(|g| g.parse::<Gender>().ok())
        .ok_or_else(|| {
            let mut errors = FieldErrors::new();
            errors.insert(Field::Gender, Field::Gender.error_message());
            errors
        })?;

    Ok(StudentPayload {
        name: text(Field::Name),
        class: text(Field::Class),
        section: text(Field::Section),
        roll_number: text(Field::RollNumber),
        date_of_birth: text(Field::DateOfBirth),
        gender,
        address: text(Field::Address),
        city: text(Field::City),
        state: text(Field::State),
        pincode: text(Field::Pincode),
        phone_number: text(Field::PhoneNumber),
        email: text(Field::Email),
        parent_name: text(Field::ParentName),
        blood_group: text(Field::BloodGroup),
        admission_date: text(Field::AdmissionDate),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn asha() -> Draft {
        Draft::new()
            .with(Field::Name, "Asha Rao")
            .with(Field::Class, "10")
            .with(Field::Section, "A")
            .with(Field::RollNumber, "23")
            .with(Field::DateOfBirth, "2009-04-01")
            .with(Field::Gender, "female")
            .with(Field::Address, "12 MG Road")
            .with(Field::City, "Pune")
            .with(Field::State, "MH")
            .with(Field::Pincode, "411001")
            .with(Field::PhoneNumber, "9876543210")
            .with(Field::Email, "asha@example.com")
            .with(Field::ParentName, "Raj Rao")
            .with(Field::BloodGroup, "O+")
            .with(Field::AdmissionDate, "2021-06-01")
    }

    #[test]
    fn valid_draft_becomes_payload() {
        let payload = validate(&asha()).unwrap();
        assert_eq!(payload.name, "Asha Rao");
        assert_eq!(payload.gender, Gender::Female);
        assert_eq!(Draft::from(&payload), asha());
    }

    #[test]
    fn invalid_email_reports_only_email() {
        let errors = validate(&asha().with(Field::Email, "not-an-email")).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(Field::Email), Some("Valid email is required"));
    }

    #[test]
    fn blank_draft_reports_every_field_in_form_order() {
        let errors = validate(&Draft::new()).unwrap_err();
        let fields: Vec<Field> = errors.fields().collect();
        assert_eq!(fields, Field::ALL.to_vec());
        assert_eq!(errors.get(Field::RollNumber), Some("Roll number is required"));
        assert_eq!(errors.get(Field::Gender), Some("Gender is required"));
    }

    #[test]
    fn length_rules_count_characters() {
        let errors = validate(
            &asha()
                .with(Field::Pincode, "41100")
                .with(Field::PhoneNumber, "987654321"),
        )
        .unwrap_err();
        assert_eq!(errors.get(Field::Pincode), Some("Valid pincode is required"));
        assert_eq!(
            errors.get(Field::PhoneNumber),
            Some("Valid phone number is required")
        );

        // no numeric format check
        assert!(validate(&asha().with(Field::Pincode, "abcdef")).is_ok());
        assert!(validate(&asha().with(Field::Pincode, "ñññññň")).is_ok());
    }

    #[test]
    fn unknown_gender_has_its_own_message() {
        let errors = validate(&asha().with(Field::Gender, "unknown")).unwrap_err();
        assert_eq!(
            errors.get(Field::Gender),
            Some("Gender must be one of male, female, other")
        );
    }

    #[test]
    fn whitespace_counts_as_content() {
        assert!(validate(&asha().with(Field::City, " ")).is_ok());
    }

    #[test]
    fn no_cross_field_date_checks() {
        let draft = asha()
            .with(Field::DateOfBirth, "2030-01-01")
            .with(Field::AdmissionDate, "1990-01-01");
        assert!(validate(&draft).is_ok());
    }

    #[test]
    fn email_syntax() {
        for ok in ["a@b.co", "first.last+tag@sub.example.org", "o'neil@example.in"] {
            assert!(is_valid_email(ok), "{ok}");
        }
        for bad in [
            "",
            "not-an-email",
            "@example.com",
            ".a@example.com",
            "a..b@example.com",
            "a@example",
            "a@example.c",
            "a.@example.com",
            "a@-example.com",
        ] {
            assert!(!is_valid_email(bad), "{bad}");
        }
    }

    #[test]
    fn display_lists_fields() {
        let errors = validate(&asha().with(Field::Email, "x").with(Field::City, "")).unwrap_err();
        assert_eq!(
            errors.to_string(),
            "2 field(s) invalid: city: City is required; email: Valid email is required"
        );
    }
}
