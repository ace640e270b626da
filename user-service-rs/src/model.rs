//! User domain types.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl User {
    pub fn new(id: &str, username: &str, email: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            username: username.to_string(),
            email: email.map(str::to_string),
        }
    }
}
