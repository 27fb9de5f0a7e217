//! User domain entity and related types.

use serde::{Deserialize, Serialize};

/// User identity record (`users` row)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl User {
    pub fn new(id: i32, username: String, password_hash: String) -> Self {
        Self {
            id,
            username,
            password_hash,
        }
    }
}

/// User data safe to print or return (no credential material)
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User::new(7, "admin".to_string(), "$argon2id$secret".to_string());
        let json = serde_json::to_string(&user).unwrap();

        assert!(json.contains("\"username\":\"admin\""));
        assert!(!json.contains("argon2id"));
    }

    #[test]
    fn test_user_response_from_user() {
        let response = UserResponse::from(User::new(3, "ops".to_string(), "h".to_string()));
        assert_eq!(response.id, 3);
        assert_eq!(response.username, "ops");
    }
}
