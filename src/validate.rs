//! Local form checks run before a call is sent.
//!
//! Each field reports at most one error: the first rule it breaks.

#[cfg(test)]
#[path = "validate_test.rs"]
mod validate_test;

use crate::net::api::ImageUpload;

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
pub const MIN_PASSWORD_CHARS: usize = 6;
const SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";
const SUPPORTED_IMAGE_TYPES: [&str; 8] = [
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/svg+xml",
    "image/bmp",
    "image/tiff",
    "image/avif",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn finish(errors: Vec<FieldError>) -> Result<(), Vec<FieldError>> {
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn has_whitespace(s: &str) -> bool {
    s.chars().any(char::is_whitespace)
}

fn looks_like_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}

fn email_error(email: &str) -> Option<&'static str> {
    if email.is_empty() {
        Some("Email is required")
    } else if has_whitespace(email) {
        Some("Email must not contain spaces")
    } else if !looks_like_email(email) {
        Some("Invalid email address")
    } else {
        None
    }
}

fn login_password_error(password: &str) -> Option<&'static str> {
    if password.is_empty() {
        Some("Password is required")
    } else if password.chars().count() < MIN_PASSWORD_CHARS {
        Some("Password must be at least 6 characters")
    } else if !password.chars().any(|c| c.is_ascii_uppercase()) {
        Some("Password must contain at least one uppercase letter")
    } else if !password.chars().any(|c| c.is_ascii_lowercase()) {
        Some("Password must contain at least one lowercase letter")
    } else if !password.chars().any(|c| c.is_ascii_digit()) {
        Some("Password must contain at least one number")
    } else if !password.chars().any(|c| SPECIAL_CHARS.contains(c)) {
        Some("Password must contain at least one special character")
    } else if has_whitespace(password) {
        Some("Password must not contain spaces")
    } else {
        None
    }
}

fn new_password_error(password: &str) -> Option<&'static str> {
    if password.is_empty() {
        Some("New password is required")
    } else if password.chars().count() < MIN_PASSWORD_CHARS {
        Some("New password must be at least 6 characters")
    } else if !password.chars().any(|c| c.is_ascii_uppercase()) {
        Some("New password must contain at least one uppercase letter")
    } else if !password.chars().any(|c| c.is_ascii_lowercase()) {
        Some("New password must contain at least one lowercase letter")
    } else if !password.chars().any(|c| c.is_ascii_digit()) {
        Some("New password must contain at least one number")
    } else if has_whitespace(password) {
        Some("New password must not contain spaces")
    } else {
        None
    }
}

/// Login and signup credentials.
pub fn credentials(email: &str, password: &str) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    if let Some(message) = email_error(email) {
        errors.push(FieldError { field: "email", message });
    }
    if let Some(message) = login_password_error(password) {
        errors.push(FieldError { field: "password", message });
    }
    finish(errors)
}

/// Password reset form.
pub fn password_reset(current: &str, password: &str, confirm: &str) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    if current.is_empty() {
        errors.push(FieldError { field: "currentPassword", message: "Current password is required" });
    } else if current.chars().count() < MIN_PASSWORD_CHARS {
        errors.push(FieldError { field: "currentPassword", message: "Current password must be at least 6 characters" });
    }
    if let Some(message) = new_password_error(password) {
        errors.push(FieldError { field: "password", message });
    }
    if confirm.is_empty() {
        errors.push(FieldError { field: "confirmPassword", message: "Confirm password is required" });
    } else if confirm != password {
        errors.push(FieldError { field: "confirmPassword", message: "Passwords must match" });
    }
    finish(errors)
}

/// Upload batch: at least one file, each a supported image of at most 5 MiB
/// with a 3 to 50 character title.
pub fn uploads(batch: &[ImageUpload]) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    if batch.is_empty() {
        errors.push(FieldError { field: "images", message: "Please select images to upload" });
        return finish(errors);
    }
    if batch.iter().any(|u| u.bytes.len() > MAX_UPLOAD_BYTES) {
        errors.push(FieldError { field: "images", message: "File too large" });
    } else if batch.iter().any(|u| !SUPPORTED_IMAGE_TYPES.contains(&u.mime.as_str())) {
        errors.push(FieldError { field: "images", message: "Unsupported file type" });
    }
    let title_error = batch.iter().find_map(|u| {
        let len = u.title.chars().count();
        if len == 0 {
            Some("Title is required")
        } else if len < 3 {
            Some("Title must be at least 3 characters")
        } else if len > 50 {
            Some("Title must be at most 50 characters")
        } else {
            None
        }
    });
    if let Some(message) = title_error {
        errors.push(FieldError { field: "titles", message });
    }
    finish(errors)
}
