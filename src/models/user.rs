use serde::{Deserialize, Serialize};

/// Account role. Only admins may approve or reject records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Donor,
    Hospital,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Donor => "donor",
            Role::Hospital => "hospital",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    pub role: Role,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// "First Last" if names are set, otherwise the username.
    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(f), Some(l)) if !f.is_empty() && !l.is_empty() => format!("{} {}", f, l),
            _ => self.username.clone(),
        }
    }
}

/// Registration payload for `POST auth/register/`.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user() {
        let json = r#"{"id": 3, "username": "donor1", "email": "d@example.com",
                       "first_name": "Dana", "last_name": "Reyes", "role": "donor"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, 3);
        assert!(!user.is_admin());
        assert_eq!(user.display_name(), "Dana Reyes");
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let json = r#"{"id": 1, "username": "admin", "role": "admin"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(user.is_admin());
        assert_eq!(user.display_name(), "admin");
    }

    #[test]
    fn test_register_payload_skips_empty_names() {
        let new = NewUser {
            username: "donor2".to_string(),
            email: "d2@example.com".to_string(),
            password: "pw123456".to_string(),
            role: Role::Donor,
            first_name: None,
            last_name: None,
        };
        let v = serde_json::to_value(&new).unwrap();
        assert_eq!(v["role"], "donor");
        assert!(v.get("first_name").is_none());
    }
}
