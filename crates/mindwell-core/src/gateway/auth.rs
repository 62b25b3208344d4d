//! Authentication endpoints and response normalization.
//!
//! The backend answers login, registration and profile requests with
//! slightly different shapes: user fields may sit under `user` or at the top
//! level (`user_id`, `username`), and registration may not return a token at
//! all while the address awaits verification. [`normalize_auth_response`]
//! folds every variant into one [`AuthResponse`].

use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::client::ApiClient;
use crate::error::GatewayError;

/// Canonical user record shared by every auth response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Option<i64>,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Result of a login or registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResponse {
    /// Bearer token. Absent after registration until the email is verified.
    pub token: Option<String>,
    pub user: SessionUser,
    pub message: Option<String>,
}

/// Fold an auth response body into the canonical shape.
///
/// `submitted_email` and `submitted_username` fill fields the backend left
/// out, mirroring what the user typed.
pub fn normalize_auth_response(
    body: &Value,
    submitted_email: &str,
    submitted_username: Option<&str>,
) -> AuthResponse {
    let nested = body.get("user").filter(|u| u.is_object());
    let field = |name: &str| nested.and_then(|u| u.get(name)).or_else(|| body.get(name));

    let id = nested
        .and_then(|u| u.get("id"))
        .or_else(|| body.get("user_id"))
        .and_then(Value::as_i64);
    let email = field("email")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(submitted_email)
        .to_string();
    let username = field("username")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| submitted_username.map(str::to_string))
        .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

    AuthResponse {
        token: body
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string),
        user: SessionUser {
            id,
            username,
            email,
            email_verified: field("email_verified")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            created_at: field("created_at")
                .and_then(Value::as_str)
                .map(str::to_string),
        },
        message: body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

impl ApiClient {
    /// `POST /api/auth/login`. The backend accepts a username or an email
    /// in the `username` field.
    ///
    /// # Errors
    /// Any non-2xx response is [`GatewayError::Auth`], except an unverified
    /// account which is [`GatewayError::EmailNotVerified`].
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, GatewayError> {
        let body = json!({ "username": email, "password": password });
        let raw = self
            .send_raw(Method::POST, "api/auth/login", &[], Some(&body))
            .await?;

        if !raw.status.is_success() {
            if raw.status == StatusCode::UNAUTHORIZED
                && raw
                    .body
                    .get("email_verification_required")
                    .and_then(Value::as_bool)
                    .unwrap_or(false)
            {
                let email = raw
                    .body
                    .get("email")
                    .and_then(Value::as_str)
                    .unwrap_or(email)
                    .to_string();
                return Err(GatewayError::EmailNotVerified { email });
            }
            return Err(GatewayError::Auth(raw.error_message()));
        }

        let response = normalize_auth_response(&raw.body, email, None);
        if response.token.is_none() {
            return Err(GatewayError::Decode {
                endpoint: "api/auth/login".into(),
                message: "missing access_token".into(),
            });
        }
        Ok(response)
    }

    /// `POST /api/auth/register`.
    ///
    /// # Errors
    /// Any non-2xx response is [`GatewayError::Auth`].
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, GatewayError> {
        let body = json!({ "username": username, "email": email, "password": password });
        let raw = self
            .send_raw(Method::POST, "api/auth/register", &[], Some(&body))
            .await?;
        if !raw.status.is_success() {
            return Err(GatewayError::Auth(raw.error_message()));
        }
        Ok(normalize_auth_response(&raw.body, email, Some(username)))
    }

    /// `POST /api/auth/verify-email`. Returns the backend's message.
    pub async fn verify_email(&self, token: &str) -> Result<String, GatewayError> {
        let body = json!({ "token": token });
        let value: Value = self
            .request(Method::POST, "api/auth/verify-email", &[], Some(&body))
            .await?;
        Ok(message_of(&value, "Email verified"))
    }

    /// `POST /api/auth/resend-verification`. Returns the backend's message.
    pub async fn resend_verification(&self, email: &str) -> Result<String, GatewayError> {
        let body = json!({ "email": email });
        let value: Value = self
            .request(Method::POST, "api/auth/resend-verification", &[], Some(&body))
            .await?;
        Ok(message_of(&value, "Verification email sent"))
    }

    /// `GET /api/auth/profile` for the current token.
    pub async fn profile(&self) -> Result<SessionUser, GatewayError> {
        let value: Value = self
            .request(Method::GET, "api/auth/profile", &[], None)
            .await?;
        Ok(normalize_auth_response(&value, "", None).user)
    }
}

fn message_of(value: &Value, fallback: &str) -> String {
    value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or(fallback)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_user_shape() {
        let body = json!({
            "access_token": "tok",
            "user": {"id": 7, "username": "ada", "email": "ada@example.com", "email_verified": true}
        });
        let r = normalize_auth_response(&body, "typed@example.com", None);
        assert_eq!(r.token.as_deref(), Some("tok"));
        assert_eq!(r.user.id, Some(7));
        assert_eq!(r.user.username, "ada");
        assert_eq!(r.user.email, "ada@example.com");
        assert!(r.user.email_verified);
    }

    #[test]
    fn flat_shape_and_fallbacks() {
        let body = json!({"access_token": "tok", "user_id": 3, "username": "bo"});
        let r = normalize_auth_response(&body, "bo@example.com", None);
        assert_eq!(r.user.id, Some(3));
        assert_eq!(r.user.username, "bo");
        assert_eq!(r.user.email, "bo@example.com");
    }

    #[test]
    fn registration_without_token() {
        let body = json!({
            "message": "Account created successfully!",
            "user": {"id": 9, "username": "cy", "email": "cy@example.com", "email_verified": false}
        });
        let r = normalize_auth_response(&body, "cy@example.com", Some("cy"));
        assert!(r.token.is_none());
        assert_eq!(r.message.as_deref(), Some("Account created successfully!"));
    }

    #[test]
    fn username_falls_back_to_email_local_part() {
        let r = normalize_auth_response(&json!({"access_token": "t"}), "dee@example.com", None);
        assert_eq!(r.user.username, "dee");
    }
}
