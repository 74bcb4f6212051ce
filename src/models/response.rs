use serde::{Deserialize, Serialize};

use super::User;

#[derive(Serialize, Deserialize, Debug)]
pub struct IndexResponse {
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct BaseResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BaseResponse {
    pub fn ok() -> Self {
        BaseResponse {
            success: true,
            error: None,
        }
    }

    pub fn failure(error: impl ToString) -> Self {
        BaseResponse {
            success: false,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct UserListResponse {
    pub users: Vec<User>,
}
