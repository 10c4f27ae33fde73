use serde::{Deserialize, Serialize};

use crate::auth::UserInfo;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub user: UserInfo,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hospital: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_login_response() {
        let json = r#"{"access_token":"abc.def","token_type":"bearer","user":{"username":"wang","full_name":"wang","role":"doctor"}}"#;
        let resp: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.access_token, "abc.def");
        assert_eq!(resp.user.username, "wang");
        assert_eq!(resp.user.role.as_deref(), Some("doctor"));
    }

    #[test]
    fn test_register_request_skips_missing_optionals() {
        let req = RegisterRequest {
            username: "liu".into(),
            email: "liu@example.org".into(),
            password: "secret".into(),
            hospital: Some("City Hospital".into()),
            ..Default::default()
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["hospital"], "City Hospital");
        assert!(value.get("full_name").is_none());
        assert!(value.get("department").is_none());
    }
}
