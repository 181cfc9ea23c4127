use lazy_static::lazy_static;
use regex::Regex;

use crate::auth::error::FieldErrors;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref HAS_UPPER: Regex = Regex::new(r"[A-Z]").unwrap();
    static ref HAS_LOWER: Regex = Regex::new(r"[a-z]").unwrap();
    static ref HAS_DIGIT: Regex = Regex::new(r"[0-9]").unwrap();
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn push(errors: &mut FieldErrors, field: &str, message: &str) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(message.to_string());
}

fn check_email(errors: &mut FieldErrors, field: &str, email: &str) {
    if !is_valid_email(email) {
        push(errors, field, "Invalid email address");
    }
}

/// Password policy used by every credential-setting flow: at least 8
/// characters with one uppercase letter, one lowercase letter and one digit.
fn check_password_policy(errors: &mut FieldErrors, field: &str, password: &str) {
    if password.chars().count() < 8 {
        push(errors, field, "Password must be at least 8 characters");
    }
    if !HAS_UPPER.is_match(password) {
        push(errors, field, "Password must contain an uppercase letter");
    }
    if !HAS_LOWER.is_match(password) {
        push(errors, field, "Password must contain a lowercase letter");
    }
    if !HAS_DIGIT.is_match(password) {
        push(errors, field, "Password must contain a digit");
    }
}

fn finish(errors: FieldErrors) -> Result<(), FieldErrors> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub fn validate_register(name: &str, email: &str, password: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    if name.trim().chars().count() < 2 {
        push(&mut errors, "name", "Name must be at least 2 characters");
    }
    check_email(&mut errors, "email", email);
    check_password_policy(&mut errors, "password", password);
    finish(errors)
}

pub fn validate_login(email: &str, password: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    check_email(&mut errors, "email", email);
    if password.is_empty() {
        push(&mut errors, "password", "Password is required");
    }
    finish(errors)
}

pub fn validate_forgot_password(email: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    check_email(&mut errors, "email", email);
    finish(errors)
}

pub fn validate_reset_password(token: &str, new_password: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    if token.is_empty() {
        push(&mut errors, "token", "Token is required");
    }
    check_password_policy(&mut errors, "password", new_password);
    finish(errors)
}

pub fn validate_change_password(
    current_password: &str,
    new_password: &str,
    confirm_password: &str,
) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    if current_password.is_empty() {
        push(&mut errors, "currentPassword", "Current password is required");
    }
    check_password_policy(&mut errors, "newPassword", new_password);
    if new_password != confirm_password {
        push(&mut errors, "confirmPassword", "Passwords do not match");
    }
    finish(errors)
}

pub fn validate_profile_update(name: &str, email: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    if name.trim().chars().count() < 2 {
        push(&mut errors, "name", "Name must be at least 2 characters");
    }
    check_email(&mut errors, "email", email);
    finish(errors)
}
