use serde::{Deserialize, Serialize};

/// A user record, both as accepted by `POST /users` and as persisted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}
