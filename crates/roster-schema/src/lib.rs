//! Roster Schema - student records and their validation
//!
//! Provides:
//! - The field catalogue (keys, labels, error messages)
//! - `StudentPayload` / `StudentRecord`: validated and stored records
//! - `StudentFields`: stored values, valid or not
//! - `Draft`: unvalidated form contents
//! - `validate`: the only path from a draft to a payload
//!
//! # Example
//!
//! ```rust
//! use roster_schema::{validate, Draft, Field};
//!
//! let draft = Draft::new().with(Field::Email, "not-an-email");
//! let errors = validate(&draft).unwrap_err();
//! assert_eq!(errors.get(Field::Email), Some("Valid email is required"));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod draft;
pub mod field;
pub mod record;
pub mod validation;

pub use draft::Draft;
pub use field::{Field, UnknownField};
pub use record::{Gender, InvalidGender, StudentFields, StudentId, StudentPayload, StudentRecord};
pub use validation::{is_valid_email, validate, FieldErrors, Rule};
