//! Session user types

use serde::{Deserialize, Serialize};

/// The authenticated operator running the import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub company_id: Option<String>,
}

/// Saved login response (what the frontend keeps in session storage)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(flatten)]
    pub user: CurrentUser,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_session_deserializes_login_payload() {
        let json = r#"{
            "token": "eyJhbGciOi",
            "id": 42,
            "username": "jnovak",
            "email": "jana@example.com",
            "fullName": "Jana Novak",
            "companyName": "Acme",
            "companyId": "c-1",
            "roles": ["ROLE_SALES"]
        }"#;

        let session: StoredSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.token.as_deref(), Some("eyJhbGciOi"));
        assert_eq!(session.user.id, 42);
        assert_eq!(session.user.full_name.as_deref(), Some("Jana Novak"));
        assert_eq!(session.roles, vec!["ROLE_SALES".to_string()]);
    }

    #[test]
    fn test_stored_session_only_requires_id() {
        let session: StoredSession = serde_json::from_str(r#"{"id": 7}"#).unwrap();
        assert_eq!(session.user.id, 7);
        assert!(session.token.is_none());
        assert!(session.roles.is_empty());
    }
}
