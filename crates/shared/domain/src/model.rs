use crate::fields::Field;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The raw values typed into the form during one interaction.
///
/// Serializes to the flat `name`/`email`/`phone`/`captcha` map sent to the form endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub captcha: String,
}

impl RegistrationForm {
    #[must_use]
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Phone => &self.phone,
            Field::Captcha => &self.captcha,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::Phone => &mut self.phone,
            Field::Captcha => &mut self.captcha,
        };
        *slot = value.into();
    }

    /// Empties every field, like resetting the form element.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Registrations recorded so far.
///
/// `count == emails.len()` is the intended shape, but nothing enforces it: the two values
/// are persisted under separate keys and may drift after a partial write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationState {
    pub count: u32,
    pub emails: BTreeSet<String>,
}

impl RegistrationState {
    /// Case-insensitive membership test.
    #[must_use]
    pub fn contains_email(&self, email: &str) -> bool {
        self.emails.contains(&normalize_email(email))
    }
}

/// Canonical form under which emails are stored and compared.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_accessors_follow_field() {
        let mut form = RegistrationForm::default();
        form.set(Field::Phone, "5551234");
        assert_eq!(form.get(Field::Phone), "5551234");
        assert_eq!(form.get(Field::Name), "");

        form.reset();
        assert_eq!(form, RegistrationForm::default());
    }

    #[test]
    fn email_membership_ignores_case_and_padding() {
        let state = RegistrationState {
            count: 1,
            emails: BTreeSet::from(["ana@example.com".to_owned()]),
        };
        assert!(state.contains_email(" Ana@Example.COM "));
        assert!(!state.contains_email("bob@example.com"));
    }
}
