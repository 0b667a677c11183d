//! Form capture — field definitions, drafts, and required-field validation.
//!
//! A form collects edits into a [`Draft`]. Submitting checks required fields
//! in declaration order and either emits a complete [`Profile`] or the first
//! [`ValidationError`]. Nothing is handed to the state machine on failure.

use std::collections::HashMap;

use crate::error::ValidationError;
use crate::profile::{Profile, ProfileField};

/// On-screen keyboard hint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyboardType {
    #[default]
    Default,
    EmailAddress,
    Numeric,
    PhonePad,
}

/// Auto-capitalization hint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AutoCapitalize {
    None,
    #[default]
    Sentences,
    Words,
    Characters,
}

/// One input on a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: ProfileField,
    pub label: &'static str,
    pub placeholder: &'static str,
    pub keyboard: KeyboardType,
    pub auto_capitalize: AutoCapitalize,
    pub secure: bool,
    pub required: bool,
}

impl FormField {
    pub fn new(name: ProfileField, label: &'static str, placeholder: &'static str) -> Self {
        Self {
            name,
            label,
            placeholder,
            keyboard: KeyboardType::default(),
            auto_capitalize: AutoCapitalize::default(),
            secure: false,
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn keyboard(mut self, keyboard: KeyboardType) -> Self {
        self.keyboard = keyboard;
        self
    }

    pub fn auto_capitalize(mut self, mode: AutoCapitalize) -> Self {
        self.auto_capitalize = mode;
        self
    }
}

/// Field edits collected before submit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    values: HashMap<ProfileField, String>,
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a draft with a stored profile's values, avatar included.
    pub fn from_profile(profile: &Profile) -> Self {
        let mut draft = Self::new();
        for field in [
            ProfileField::FirstName,
            ProfileField::LastName,
            ProfileField::Email,
            ProfileField::PhoneNumber,
            ProfileField::Image,
        ] {
            if let Some(value) = profile.get(field) {
                draft.set(field, value);
            }
        }
        draft
    }

    pub fn set(&mut self, field: ProfileField, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn get(&self, field: ProfileField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    fn is_blank(&self, field: ProfileField) -> bool {
        self.get(field).is_none_or(str::is_empty)
    }
}

/// An ordered set of fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSpec {
    fields: Vec<FormField>,
}

impl FormSpec {
    pub fn new(fields: Vec<FormField>) -> Self {
        Self { fields }
    }

    /// First-run form: name and email.
    pub fn onboarding() -> Self {
        Self::new(vec![
            FormField::new(ProfileField::FirstName, "First Name", "Enter your name").required(),
            FormField::new(ProfileField::Email, "Email", "Enter your email")
                .keyboard(KeyboardType::EmailAddress)
                .auto_capitalize(AutoCapitalize::None)
                .required(),
        ])
    }

    /// Profile-screen form: full personal information.
    pub fn profile() -> Self {
        Self::new(vec![
            FormField::new(ProfileField::FirstName, "First Name", "Enter your name").required(),
            FormField::new(ProfileField::LastName, "Last Name", "Enter your last name")
                .required(),
            FormField::new(ProfileField::Email, "Email", "Enter your email")
                .keyboard(KeyboardType::EmailAddress)
                .auto_capitalize(AutoCapitalize::None)
                .required(),
            FormField::new(
                ProfileField::PhoneNumber,
                "Phone Number",
                "Enter your phone number",
            )
            .keyboard(KeyboardType::PhonePad)
            .required(),
        ])
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Validate `draft` and build the record to hand to the state machine.
    ///
    /// The record holds every non-empty value in the draft, including ones
    /// seeded from a stored profile that this form doesn't show.
    pub fn submit(&self, draft: &Draft) -> Result<Profile, ValidationError> {
        if let Some(missing) = self
            .fields
            .iter()
            .find(|field| field.required && draft.is_blank(field.name))
        {
            tracing::debug!(field = %missing.name, "Required field empty");
            return Err(ValidationError {
                field: missing.name,
                label: missing.label.to_string(),
            });
        }

        let mut profile = Profile::default();
        for (field, value) in &draft.values {
            profile.set(*field, value.as_str());
        }
        Ok(profile)
    }
}
