//! Input rules shared by the service and the HTTP DTOs

use crate::domain::{AuthError, AuthResult, ProfileUpdate};

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 50;
/// bcrypt ignores everything past 72 bytes
pub const PASSWORD_MAX_BYTES: usize = 72;
pub const DISPLAY_NAME_MAX_LEN: usize = 100;

pub fn validate_username(username: &str) -> AuthResult<()> {
    let len = username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err(AuthError::Validation(format!(
            "Username must be {}-{} characters",
            USERNAME_MIN_LEN, USERNAME_MAX_LEN
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(AuthError::Validation(
            "Username may only contain letters, digits, '_', '.' and '-'".into(),
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> AuthResult<()> {
    if password.is_empty() {
        return Err(AuthError::Validation("Password is required".into()));
    }
    if password.len() > PASSWORD_MAX_BYTES {
        return Err(AuthError::Validation(format!(
            "Password must be at most {} bytes",
            PASSWORD_MAX_BYTES
        )));
    }
    Ok(())
}

pub fn validate_profile(update: &ProfileUpdate) -> AuthResult<()> {
    if let Some(email) = &update.email {
        if !email.contains('@') {
            return Err(AuthError::Validation("Invalid email address".into()));
        }
    }
    if let Some(name) = &update.display_name {
        if name.trim().is_empty() || name.chars().count() > DISPLAY_NAME_MAX_LEN {
            return Err(AuthError::Validation(format!(
                "Display name must be 1-{} characters",
                DISPLAY_NAME_MAX_LEN
            )));
        }
    }
    if let Some(password) = &update.password {
        validate_password(password)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rules() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("a.b-c_d").is_ok());
        assert!(validate_username("al").is_err());
        assert!(validate_username(&"x".repeat(51)).is_err());
        assert!(validate_username("alice smith").is_err());
        assert!(validate_username("al/ce").is_err());
    }

    #[test]
    fn password_rules() {
        assert!(validate_password("pw1").is_ok());
        assert!(validate_password("").is_err());
        assert!(validate_password(&"p".repeat(72)).is_ok());
        assert!(validate_password(&"p".repeat(73)).is_err());
    }

    #[test]
    fn profile_rules() {
        assert!(validate_profile(&ProfileUpdate::default()).is_ok());
        assert!(validate_profile(&ProfileUpdate {
            email: Some("nope".into()),
            ..Default::default()
        })
        .is_err());
        assert!(validate_profile(&ProfileUpdate {
            display_name: Some("   ".into()),
            ..Default::default()
        })
        .is_err());
    }
}
