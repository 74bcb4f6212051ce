use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use log::debug;
use serde_json::Value;
use tokio::fs;

use crate::{error::StoreError, models::User};

/// Flat JSON file holding every user record as one array.
///
/// Every write rewrites the whole file and there is no lock around the
/// read-modify-write, so concurrent writers can lose each other's records.
#[derive(Clone, Debug)]
pub struct UserStore {
    path: PathBuf,
}

impl UserStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        UserStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn read_users_data(&self) -> Result<Vec<User>, StoreError> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str::<Value>(&contents)? {
            Value::Array(items) => items
                .into_iter()
                .map(|item| serde_json::from_value(item).map_err(StoreError::from))
                .collect(),
            _ => Err(StoreError::NotAList),
        }
    }

    pub async fn add_user_data(&self, user: User) -> Result<(), StoreError> {
        let mut users = self.read_users_data().await?;
        users.push(user);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let contents = serde_json::to_string_pretty(&users)?;
        fs::write(&self.path, contents).await?;

        debug!("{} users written to {}", users.len(), self.path.display());
        Ok(())
    }
}
