// This file is part of the product LinkPress.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::types::{IamError, UsersData, YamlUsersData};
use std::path::PathBuf;

pub trait UserStore: Send + Sync {
    fn load(&self) -> Result<UsersData, IamError>;
}

/// Users file on disk, keyed by email. The console treats the file as
/// read-only; account changes happen through operator tooling.
pub struct FileUserStore {
    users_file: PathBuf,
}

impl FileUserStore {
    pub fn new(users_file: PathBuf) -> Result<Self, IamError> {
        if users_file.as_os_str().is_empty() {
            return Err(IamError::ConfigurationError(
                "Users file path is empty".to_string(),
            ));
        }
        Ok(Self { users_file })
    }

    fn parse_users(content: &str) -> Result<UsersData, IamError> {
        let yaml_users: YamlUsersData = serde_yaml::from_str(content)
            .map_err(|e| IamError::ParseError(format!("Failed to parse users file: {}", e)))?;

        let mut users_data = UsersData::new();
        for (email, yaml_user) in yaml_users {
            users_data.insert(email.clone(), yaml_user.into_user(email));
        }
        Ok(users_data)
    }
}

impl UserStore for FileUserStore {
    fn load(&self) -> Result<UsersData, IamError> {
        let content = std::fs::read_to_string(&self.users_file)
            .map_err(|e| IamError::FileError(format!("Failed to read users file: {}", e)))?;
        Self::parse_users(&content)
    }
}

#[cfg(test)]
pub struct MemoryUserStore {
    users: UsersData,
}

#[cfg(test)]
impl MemoryUserStore {
    pub fn new(users: UsersData) -> Self {
        Self { users }
    }
}

#[cfg(test)]
impl UserStore for MemoryUserStore {
    fn load(&self) -> Result<UsersData, IamError> {
        Ok(self.users.clone())
    }
}
