//! Committed student records
//!
//! `StudentPayload` is a record that passed validation but has no identity
//! yet. `StudentRecord` is whatever the store holds under an id; its
//! `StudentFields` are plain strings because the store enforces no schema.

use crate::draft::Draft;
use crate::field::Field;
use crate::validation::{validate, FieldErrors};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Store-assigned record identifier (opaque)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(String);

impl StudentId {
    /// Wrap a store-issued id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Raw id string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, as shown in list views
    #[must_use]
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for StudentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for StudentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Gender values accepted by the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// All accepted values
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    /// Wire value
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value outside the gender enumeration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid gender: {0:?}")]
pub struct InvalidGender(pub String);

impl FromStr for Gender {
    type Err = InvalidGender;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| InvalidGender(s.to_string()))
    }
}

/// Validated record contents, without an id
///
/// Only [`crate::validate`] produces one from user input, so every string
/// field is non-empty and the length/email rules hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPayload {
    pub name: String,
    pub class: String,
    pub section: String,
    pub roll_number: String,
    pub date_of_birth: String,
    pub gender: Gender,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub phone_number: String,
    pub email: String,
    pub parent_name: String,
    pub blood_group: String,
    pub admission_date: String,
}

impl StudentPayload {
    /// Text value of a field, for rendering
    #[must_use]
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Class => &self.class,
            Field::Section => &self.section,
            Field::RollNumber => &self.roll_number,
            Field::DateOfBirth => &self.date_of_birth,
            Field::Gender => self.gender.as_str(),
            Field::Address => &self.address,
            Field::City => &self.city,
            Field::State => &self.state,
            Field::Pincode => &self.pincode,
            Field::PhoneNumber => &self.phone_number,
            Field::Email => &self.email,
            Field::ParentName => &self.parent_name,
            Field::BloodGroup => &self.blood_group,
            Field::AdmissionDate => &self.admission_date,
        }
    }
}

/// Field values as stored
///
/// Missing keys read as empty strings and gender is kept verbatim, so a
/// document written by another client still lists. Call
/// [`StudentFields::validated`] before treating the values as a payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentFields {
    pub name: String,
    pub class: String,
    pub section: String,
    pub roll_number: String,
    pub date_of_birth: String,
    pub gender: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub phone_number: String,
    pub email: String,
    pub parent_name: String,
    pub blood_group: String,
    pub admission_date: String,
}

impl StudentFields {
    fn slot_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.name,
            Field::Class => &mut self.class,
            Field::Section => &mut self.section,
            Field::RollNumber => &mut self.roll_number,
            Field::DateOfBirth => &mut self.date_of_birth,
            Field::Gender => &mut self.gender,
            Field::Address => &mut self.address,
            Field::City => &mut self.city,
            Field::State => &mut self.state,
            Field::Pincode => &mut self.pincode,
            Field::PhoneNumber => &mut self.phone_number,
            Field::Email => &mut self.email,
            Field::ParentName => &mut self.parent_name,
            Field::BloodGroup => &mut self.blood_group,
            Field::AdmissionDate => &mut self.admission_date,
        }
    }

    #[must_use]
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Class => &self.class,
            Field::Section => &self.section,
            Field::RollNumber => &self.roll_number,
            Field::DateOfBirth => &self.date_of_birth,
            Field::Gender => &self.gender,
            Field::Address => &self.address,
            Field::City => &self.city,
            Field::State => &self.state,
            Field::Pincode => &self.pincode,
            Field::PhoneNumber => &self.phone_number,
            Field::Email => &self.email,
            Field::ParentName => &self.parent_name,
            Field::BloodGroup => &self.blood_group,
            Field::AdmissionDate => &self.admission_date,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        *self.slot_mut(field) = value.into();
    }

    /// The stored values as a payload, or every rule they break
    ///
    /// # Errors
    /// The same `FieldErrors` a form submit of these values would report.
    pub fn validated(&self) -> Result<StudentPayload, FieldErrors> {
        validate(&Draft::from(self))
    }
}

impl From<&StudentPayload> for StudentFields {
    fn from(payload: &StudentPayload) -> Self {
        let mut fields = Self::default();
        for field in Field::ALL {
            fields.set(field, payload.get(field));
        }
        fields
    }
}

impl From<StudentPayload> for StudentFields {
    fn from(payload: StudentPayload) -> Self {
        Self::from(&payload)
    }
}

impl PartialEq<StudentPayload> for StudentFields {
    fn eq(&self, other: &StudentPayload) -> bool {
        Field::ALL.into_iter().all(|f| self.get(f) == other.get(f))
    }
}

/// A stored student: store-assigned id plus its fields
///
/// Serializes flat, matching the stored document shape
/// `{ "id": ..., "name": ..., ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub id: StudentId,
    #[serde(flatten)]
    pub fields: StudentFields,
}

impl StudentRecord {
    #[inline]
    #[must_use]
    pub fn new(id: StudentId, fields: impl Into<StudentFields>) -> Self {
        Self {
            id,
            fields: fields.into(),
        }
    }

    /// Display name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.fields.name
    }

    /// Whether the stored values would pass validation as they are
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.fields.validated().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> StudentPayload {
        StudentPayload {
            name: "Asha Rao".into(),
            class: "10".into(),
            section: "A".into(),
            roll_number: "23".into(),
            date_of_birth: "2009-04-01".into(),
            gender: Gender::Female,
            address: "12 MG Road".into(),
            city: "Pune".into(),
            state: "MH".into(),
            pincode: "411001".into(),
            phone_number: "9876543210".into(),
            email: "asha@example.com".into(),
            parent_name: "Raj Rao".into(),
            blood_group: "O+".into(),
            admission_date: "2021-06-01".into(),
        }
    }

    #[test]
    fn short_id_is_eight_chars_or_whole_id() {
        assert_eq!(StudentId::new("01HZX3ABCDEF").short(), "01HZX3AB");
        assert_eq!(StudentId::new("abc").short(), "abc");
    }

    #[test]
    fn record_serializes_flat_with_camel_case_keys() {
        let record = StudentRecord::new(StudentId::new("s1"), payload());
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["id"], "s1");
        assert_eq!(value["rollNumber"], "23");
        assert_eq!(value["gender"], "female");
        assert_eq!(value["admissionDate"], "2021-06-01");
        assert_eq!(value.as_object().unwrap().len(), 16);
    }

    #[test]
    fn get_covers_every_field() {
        let p = payload();
        for field in Field::ALL {
            assert!(!p.get(field).is_empty(), "{field} empty");
        }
        assert_eq!(p.get(Field::PhoneNumber), "9876543210");
    }

    #[test]
    fn stored_fields_tolerate_missing_keys_and_raw_gender() {
        let fields: StudentFields = serde_json::from_value(serde_json::json!({
            "name": "Legacy Pupil",
            "gender": "Female",
        }))
        .unwrap();
        assert_eq!(fields.name, "Legacy Pupil");
        assert_eq!(fields.gender, "Female");
        assert_eq!(fields.blood_group, "");

        let errors = fields.validated().unwrap_err();
        assert_eq!(
            errors.get(Field::Gender),
            Some("Gender must be one of male, female, other")
        );
        assert_eq!(errors.get(Field::BloodGroup), Some("Blood group is required"));
        assert!(!errors.contains(Field::Name));
    }

    #[test]
    fn stored_fields_from_payload_validate_back_to_it() {
        let fields = StudentFields::from(payload());
        assert_eq!(fields, payload());
        assert_eq!(fields.validated(), Ok(payload()));
        assert!(StudentRecord::new(StudentId::new("s1"), payload()).is_valid());
    }

    #[test]
    fn gender_parses_only_enumerated_values() {
        assert_eq!("other".parse::<Gender>(), Ok(Gender::Other));
        assert!("Female".parse::<Gender>().is_err());
        assert!("".parse::<Gender>().is_err());
    }
}
