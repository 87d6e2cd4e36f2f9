// This file is part of the product LinkPress.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::password::verify_password;
use super::store::UserStore;
use super::types::{IamError, User, UsersData};

/// Staff accounts loaded once at startup. Lookups are read-only, so the
/// directory can be shared across workers without locking.
pub struct UserDirectory {
    users: UsersData,
}

impl UserDirectory {
    pub fn from_store(store: &dyn UserStore) -> Result<Self, IamError> {
        let users = store.load()?;
        if users.is_empty() {
            log::warn!("Users file contains no accounts; nobody will be able to sign in");
        }
        Ok(Self { users })
    }

    pub fn find(&self, email: &str) -> Option<&User> {
        self.users.get(email)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Check a credential pair. Returns the user only when the account
    /// exists, has a password set, and the password verifies. Unknown
    /// accounts and wrong passwords are indistinguishable to the caller.
    pub fn authenticate(&self, email: &str, password: &str) -> Option<&User> {
        let user = self.users.get(email)?;
        let stored_hash = user.password_hash.as_deref()?;
        if verify_password(password, stored_hash) {
            Some(user)
        } else {
            None
        }
    }
}
