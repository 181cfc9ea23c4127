use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::error::FieldErrors;
use crate::auth::repo_types::{Currency, DefaultHome, ThemePreference, User};

/// Uniform envelope for every credential operation response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<FieldErrors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            error: None,
            field_errors: None,
            data: Some(data),
        }
    }

    pub fn err(message: String) -> Self {
        Self {
            success: false,
            error: Some(message),
            field_errors: None,
            data: None,
        }
    }

    pub fn invalid(fields: FieldErrors) -> Self {
        Self {
            success: false,
            error: Some("Invalid fields".to_string()),
            field_errors: Some(fields),
            data: None,
        }
    }
}

/// Request body for registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for the forgot-password flow.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Request body for redeeming a reset token.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

/// Request body for an authenticated password change.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Request body for profile/preferences updates.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: String,
    pub email: String,
    pub preferred_currency: Currency,
    pub default_home: DefaultHome,
    pub theme_preference: ThemePreference,
    pub email_notifications: bool,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub preferred_currency: Currency,
    pub default_home: DefaultHome,
    pub theme_preference: ThemePreference,
    pub email_notifications: bool,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            preferred_currency: user.preferred_currency,
            default_home: user.default_home,
            theme_preference: user.theme_preference,
            email_notifications: user.email_notifications,
        }
    }
}

/// Response returned after register and login: the session token the caller
/// stores client-side, plus where to land next.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
    pub redirect_to: String,
}

/// Response of the forgot-password flow. The message is identical whether or
/// not the email exists; `reset_token` is only populated when the dev-only
/// echo flag is on.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::error::field_error;

    #[test]
    fn envelope_omits_empty_fields() {
        let ok: ApiResponse<MessageResponse> = ApiResponse::ok(MessageResponse {
            message: "done".into(),
        });
        let json = serde_json::to_string(&ok).unwrap();
        assert!(json.contains(r#""success":true"#));
        assert!(!json.contains("error"));
        assert!(!json.contains("fieldErrors"));
    }

    #[test]
    fn field_errors_keyed_by_path() {
        let resp: ApiResponse<()> = ApiResponse::invalid(field_error(
            "confirmPassword",
            "Passwords do not match",
        ));
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains(r#""fieldErrors":{"confirmPassword":["Passwords do not match"]}"#));
    }
}
