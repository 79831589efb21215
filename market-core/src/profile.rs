use crate::error::{ApiError, FieldErrors, NON_FIELD_ERRORS};
use crate::models::{ProfileUpdate, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Username,
    Email,
    Phone,
}

impl ProfileField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }
}

/// Edit form for the signed-in user's own profile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileForm {
    pub username: String,
    pub email: String,
    pub phone: String,
    errors: FieldErrors,
    submitting: bool,
}

impl ProfileForm {
    pub fn from_user(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            phone: user.phone.clone().unwrap_or_default(),
            ..Default::default()
        }
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, field: ProfileField) -> Option<&str> {
        self.errors.get(field.as_str())
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn set_field(&mut self, field: ProfileField, value: &str) {
        match field {
            ProfileField::Username => self.username = value.to_string(),
            ProfileField::Email => self.email = value.to_string(),
            ProfileField::Phone => self.phone = value.to_string(),
        }
        self.errors.remove(field.as_str());
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.username.trim().is_empty() {
            errors.insert(ProfileField::Username.as_str(), "Username is required");
        }
        if self.email.trim().is_empty() {
            errors.insert(ProfileField::Email.as_str(), "Email is required");
        } else if !self.email.contains('@') {
            errors.insert(ProfileField::Email.as_str(), "Enter a valid email address");
        }
        errors
    }

    /// The update to send, or `None` when validation failed.
    pub fn begin_submit(&mut self) -> Option<ProfileUpdate> {
        if self.submitting {
            return None;
        }
        self.errors = self.validate();
        if !self.errors.is_empty() {
            return None;
        }
        self.submitting = true;
        let phone = self.phone.trim();
        Some(ProfileUpdate {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: (!phone.is_empty()).then(|| phone.to_string()),
        })
    }

    /// Returns the saved user, or keeps the form open with merged errors.
    pub fn finish_submit(&mut self, result: Result<User, ApiError>) -> Option<User> {
        self.submitting = false;
        match result {
            Ok(user) => {
                *self = Self::from_user(&user);
                Some(user)
            }
            Err(ApiError::Validation(server)) => {
                self.errors.merge(server);
                None
            }
            Err(e) => {
                tracing::warn!("Failed to update profile: {}", e);
                self.errors.insert(NON_FIELD_ERRORS, e.user_message());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: 3,
            username: "anna".into(),
            email: "anna@example.com".into(),
            phone: Some("5551234567".into()),
            profile_photo: None,
            is_staff: false,
            is_blocked: false,
            active_listings_count: Some(2),
        }
    }

    #[test]
    fn blank_fields_block_submit() {
        let mut form = ProfileForm::from_user(&user());
        form.set_field(ProfileField::Username, " ");
        form.set_field(ProfileField::Email, "nope");
        assert_eq!(form.begin_submit(), None);
        assert!(form.error(ProfileField::Username).is_some());
        assert!(form.error(ProfileField::Email).is_some());
        assert!(!form.is_submitting());
    }

    #[test]
    fn server_errors_are_merged() {
        let mut form = ProfileForm::from_user(&user());
        let update = form.begin_submit().unwrap();
        assert_eq!(update.phone.as_deref(), Some("5551234567"));

        let mut server = FieldErrors::new();
        server.insert("username", "A user with that username already exists.");
        assert_eq!(form.finish_submit(Err(ApiError::Validation(server))), None);
        assert_eq!(
            form.error(ProfileField::Username),
            Some("A user with that username already exists.")
        );
    }

    #[test]
    fn saved_user_resets_form() {
        let mut form = ProfileForm::from_user(&user());
        form.set_field(ProfileField::Phone, "");
        let update = form.begin_submit().unwrap();
        assert_eq!(update.phone, None);

        let mut saved = user();
        saved.phone = None;
        let returned = form.finish_submit(Ok(saved)).unwrap();
        assert_eq!(returned.id, 3);
        assert_eq!(form.phone, "");
        assert!(form.errors().is_empty());
    }
}
