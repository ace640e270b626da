//! User domain operations.

use std::sync::Arc;

use serde_json::Value;

use service_core::{CoreError, DetailLog};

use crate::model::User;
use crate::repository::UserRepository;

const COMPONENT: &str = "UserService";

pub struct UserService {
    repository: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    pub async fn find_all_users(&self, detail: &DetailLog) -> Result<Vec<User>, CoreError> {
        let cmd = "findAllUser";
        detail.add_detail(COMPONENT, cmd, None);

        let users = self
            .repository
            .find_all()
            .await
            .map_err(|err| CoreError::Handler(err.to_string()))?;

        detail.add_response_body(COMPONENT, cmd, to_value(&users));
        Ok(users)
    }

    pub async fn find_user_by_id(
        &self,
        id: &str,
        detail: &DetailLog,
    ) -> Result<Option<User>, CoreError> {
        let cmd = "findUserById";
        detail.add_detail(COMPONENT, cmd, Some(id));

        let user = self
            .repository
            .find_by_id(id)
            .await
            .map_err(|err| CoreError::Handler(err.to_string()))?;

        detail.add_response_body(COMPONENT, cmd, to_value(&user));
        Ok(user)
    }
}

fn to_value<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
