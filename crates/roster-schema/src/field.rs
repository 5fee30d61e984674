//! Field catalogue for student records
//!
//! Every attribute of a student record, in display order, with its wire key,
//! its form label and the message shown when it fails validation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One attribute of a student record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Name,
    Class,
    Section,
    RollNumber,
    DateOfBirth,
    Gender,
    Address,
    City,
    State,
    Pincode,
    PhoneNumber,
    Email,
    ParentName,
    BloodGroup,
    AdmissionDate,
}

impl Field {
    /// All fields in form/display order
    pub const ALL: [Field; 15] = [
        Field::Name,
        Field::Class,
        Field::Section,
        Field::RollNumber,
        Field::DateOfBirth,
        Field::Gender,
        Field::Address,
        Field::City,
        Field::State,
        Field::Pincode,
        Field::PhoneNumber,
        Field::Email,
        Field::ParentName,
        Field::BloodGroup,
        Field::AdmissionDate,
    ];

    /// Key used in stored documents and JSON drafts
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Class => "class",
            Self::Section => "section",
            Self::RollNumber => "rollNumber",
            Self::DateOfBirth => "dateOfBirth",
            Self::Gender => "gender",
            Self::Address => "address",
            Self::City => "city",
            Self::State => "state",
            Self::Pincode => "pincode",
            Self::PhoneNumber => "phoneNumber",
            Self::Email => "email",
            Self::ParentName => "parentName",
            Self::BloodGroup => "bloodGroup",
            Self::AdmissionDate => "admissionDate",
        }
    }

    /// Human label for forms and detail views
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Class => "Class",
            Self::Section => "Section",
            Self::RollNumber => "Roll Number",
            Self::DateOfBirth => "Date of Birth",
            Self::Gender => "Gender",
            Self::Address => "Address",
            Self::City => "City",
            Self::State => "State",
            Self::Pincode => "Pincode",
            Self::PhoneNumber => "Phone Number",
            Self::Email => "Email",
            Self::ParentName => "Parent Name",
            Self::BloodGroup => "Blood Group",
            Self::AdmissionDate => "Admission Date",
        }
    }

    /// Message reported when the field's rule is violated.
    ///
    /// Gender has two distinct messages; this returns the "missing" one and
    /// the validator reports unknown values separately.
    #[must_use]
    pub fn error_message(self) -> &'static str {
        match self {
            Self::Name => "Name is required",
            Self::Class => "Class is required",
            Self::Section => "Section is required",
            Self::RollNumber => "Roll number is required",
            Self::DateOfBirth => "Date of birth is required",
            Self::Gender => "Gender is required",
            Self::Address => "Address is required",
            Self::City => "City is required",
            Self::State => "State is required",
            Self::Pincode => "Valid pincode is required",
            Self::PhoneNumber => "Valid phone number is required",
            Self::Email => "Valid email is required",
            Self::ParentName => "Parent name is required",
            Self::BloodGroup => "Blood group is required",
            Self::AdmissionDate => "Admission date is required",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Unknown field key
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.key() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}
