//! Sign-up and login forms. Credentials are checked by the external auth
//! provider; only the shape of the submission is validated here.

use serde_json::Value;

use crate::validation::{Schema, Validator, Violation};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
}

impl Schema for SignupForm {
    fn parse(value: &Value) -> Result<SignupForm, Vec<Violation>> {
        let mut v = Validator::root(value)?;

        let email = v.string("email");
        v.email("email", email.as_deref(), "Invalid email address.");

        let password = v.string("password");
        v.min_chars(
            "password",
            password.as_deref(),
            6,
            "Password must be at least 6 characters.",
        );

        let confirm_password = v.string("confirmPassword");
        if let (Some(password), Some(confirm_password)) = (&password, &confirm_password) {
            if password != confirm_password {
                v.violation("confirmPassword", "Passwords don't match.");
            }
        }

        v.finish(SignupForm {
            email: email.unwrap_or_default(),
            password: password.unwrap_or_default(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl Schema for LoginForm {
    fn parse(value: &Value) -> Result<LoginForm, Vec<Violation>> {
        let mut v = Validator::root(value)?;

        let email = v.string("email");
        v.email("email", email.as_deref(), "Invalid email address.");

        let password = v.string("password");
        v.min_chars("password", password.as_deref(), 1, "Password is required.");

        v.finish(LoginForm {
            email: email.unwrap_or_default(),
            password: password.unwrap_or_default(),
        })
    }
}
