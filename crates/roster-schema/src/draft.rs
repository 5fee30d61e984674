//! Form drafts
//!
//! A draft is the unvalidated contents of an open form. Every attribute is
//! optional until the draft is committed through [`crate::validate`], which
//! is the only way to obtain a [`StudentPayload`].

use crate::field::Field;
use crate::record::{StudentFields, StudentPayload, StudentRecord};
use serde::{Deserialize, Serialize};

/// Unvalidated form contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Draft {
    pub name: Option<String>,
    pub class: Option<String>,
    pub section: Option<String>,
    pub roll_number: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub parent_name: Option<String>,
    pub blood_group: Option<String>,
    pub admission_date: Option<String>,
}

impl Draft {
    /// Empty draft, as opened by "add"
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, field: Field) -> &Option<String> {
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

    fn slot_mut(&mut self, field: Field) -> &mut Option<String> {
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

    /// Current raw value of a field, if set
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.slot(field).as_deref()
    }

    /// Set a field's raw value
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        *self.slot_mut(field) = Some(value.into());
    }

    /// Unset a field
    pub fn clear(&mut self, field: Field) {
        *self.slot_mut(field) = None;
    }

    /// Builder form of [`Draft::set`]
    #[must_use]
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// True when no field has been set
    #[must_use]
    pub fn is_blank(&self) -> bool {
        Field::ALL.into_iter().all(|f| self.slot(f).is_none())
    }
}

impl From<&StudentPayload> for Draft {
    fn from(payload: &StudentPayload) -> Self {
        let mut draft = Self::new();
        for field in Field::ALL {
            draft.set(field, payload.get(field));
        }
        draft
    }
}

impl From<&StudentFields> for Draft {
    fn from(fields: &StudentFields) -> Self {
        let mut draft = Self::new();
        for field in Field::ALL {
            draft.set(field, fields.get(field));
        }
        draft
    }
}

impl From<&StudentRecord> for Draft {
    fn from(record: &StudentRecord) -> Self {
        Self::from(&record.fields)
    }
}
