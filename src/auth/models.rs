//! Authentication Models
//! Mission: Define user accounts, roles and token claims

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub role: UserRole,
    pub created_at: String,
}

/// User roles for RBAC
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum UserRole {
    #[serde(rename = "admin")]
    Admin, // Full access, raw ledger writes, user management
    #[serde(rename = "creator")]
    Creator, // Uploads videos, distributes their revenue
    #[serde(rename = "viewer")]
    Viewer, // Watches and invests
}

impl UserRole {
    pub fn as_str(&self) -> &str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Creator => "creator",
            UserRole::Viewer => "viewer",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(UserRole::Admin),
            "creator" => Some(UserRole::Creator),
            "viewer" => Some(UserRole::Viewer),
            _ => None,
        }
    }
}

/// JWT Claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // subject (user_id)
    pub username: String,
    pub role: UserRole,
    pub exp: usize, // expiration timestamp
}


/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Self-service signup; admins are only created by other admins
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default = "default_signup_role")]
    pub role: UserRole,
}

fn default_signup_role() -> UserRole {
    UserRole::Viewer
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: usize, // seconds until expiration
    pub role: UserRole,
    pub user: UserResponse,
}

/// User response (sanitized)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub role: UserRole,
    pub created_at: String,
}

impl UserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            role: user.role.clone(),
            created_at: user.created_at.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_serialization() {
        let admin = UserRole::Admin;
        let json = serde_json::to_string(&admin).unwrap();
        assert_eq!(json, r#""admin""#);

        let creator: UserRole = serde_json::from_str(r#""creator""#).unwrap();
        assert_eq!(creator, UserRole::Creator);
    }

    #[test]
    fn test_user_role_string_conversion() {
        assert_eq!(UserRole::Creator.as_str(), "creator");
        assert_eq!(UserRole::from_str("VIEWER"), Some(UserRole::Viewer));
        assert_eq!(UserRole::from_str("trader"), None);
    }

    #[test]
    fn test_register_defaults_to_viewer() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"username": "v", "password": "longenough"}"#).unwrap();
        assert_eq!(req.role, UserRole::Viewer);
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            username: "maya".to_string(),
            password_hash: "$2b$secret".to_string(),
            role: UserRole::Creator,
            created_at: "2026-01-01T00:00:00Z".to_string(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret"));
    }
}
