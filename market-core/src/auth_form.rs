//! Login and registration input checks run before anything is sent.

use crate::error::FieldErrors;
use crate::models::{LoginRequest, RegisterRequest};

pub const PASSWORD_MISMATCH: &str = "Password fields didn't match.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.username.trim().is_empty() {
            errors.insert("username", "Username is required");
        }
        if self.password.is_empty() {
            errors.insert("password", "Password is required");
        }
        errors
    }

    pub fn to_request(&self) -> Result<LoginRequest, FieldErrors> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(LoginRequest {
            username: self.username.trim().to_string(),
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub password_confirm: String,
}

impl RegisterForm {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.username.trim().is_empty() {
            errors.insert("username", "Username is required");
        }

        let email = self.email.trim();
        if email.is_empty() {
            errors.insert("email", "Email is required");
        } else if !is_plausible_email(email) {
            errors.insert("email", "Enter a valid email address");
        }

        if self.password.is_empty() {
            errors.insert("password", "Password is required");
        } else if self.password != self.password_confirm {
            errors.insert("password", PASSWORD_MISMATCH);
        }
        errors
    }

    pub fn to_request(&self) -> Result<RegisterRequest, FieldErrors> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }
        let phone = self.phone.trim();
        Ok(RegisterRequest {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: (!phone.is_empty()).then(|| phone.to_string()),
            password: self.password.clone(),
            password_confirm: self.password_confirm.clone(),
        })
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_needs_both_fields() {
        let errors = LoginForm::default().validate();
        assert!(errors.contains("username"));
        assert!(errors.contains("password"));

        let request = LoginForm::new(" anna ", "secret").to_request().unwrap();
        assert_eq!(request.username, "anna");
    }

    #[test]
    fn register_checks_password_confirmation() {
        let form = RegisterForm {
            username: "anna".into(),
            email: "anna@example.com".into(),
            phone: String::new(),
            password: "secret-1".into(),
            password_confirm: "secret-2".into(),
        };
        let errors = form.to_request().unwrap_err();
        assert_eq!(errors.get("password"), Some(PASSWORD_MISMATCH));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn register_omits_blank_phone() {
        let form = RegisterForm {
            username: "anna".into(),
            email: "anna@example.com".into(),
            phone: "  ".into(),
            password: "secret".into(),
            password_confirm: "secret".into(),
        };
        assert_eq!(form.to_request().unwrap().phone, None);
    }

    #[test]
    fn email_shape() {
        assert!(is_plausible_email("a@b.co"));
        assert!(!is_plausible_email("a@b"));
        assert!(!is_plausible_email("@b.co"));
        assert!(!is_plausible_email("plain"));
    }
}
