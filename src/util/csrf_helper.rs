// This file is part of the product LinkPress.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::iam::AuthRequest;
use actix_web::HttpRequest;
use argon2::password_hash::rand_core::{OsRng, RngCore};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

const CSRF_TOKEN_EXPIRY_SECONDS: u64 = 3600;
const CSRF_TOKEN_BYTES: usize = 32;

#[derive(Clone, Debug)]
struct CsrfTokenData {
    token: String,
    created_at: Instant,
}

/// One CSRF token per session (keyed by JWT ID), embedded in every mutating
/// form and checked on submit. Tokens renew on successful validation.
pub struct CsrfTokenStore {
    tokens: Mutex<HashMap<String, CsrfTokenData>>,
    expiry: Duration,
}

impl CsrfTokenStore {
    pub fn new() -> Self {
        Self {
            tokens: Mutex::new(HashMap::new()),
            expiry: Duration::from_secs(CSRF_TOKEN_EXPIRY_SECONDS),
        }
    }

    pub fn expiry_seconds(&self) -> u64 {
        self.expiry.as_secs()
    }

    fn generate_token() -> String {
        let mut bytes = [0u8; CSRF_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Return the live token for a session, minting a fresh one when the
    /// session has none or the old token has expired.
    pub fn get_or_refresh_token(&self, jwt_id: &str) -> String {
        let mut tokens = self.tokens.lock().unwrap_or_else(|poisoned| {
            // A panic while holding the lock cannot corrupt a token map.
            poisoned.into_inner()
        });

        match tokens.get(jwt_id) {
            Some(data) if data.created_at.elapsed() < self.expiry => data.token.clone(),
            _ => {
                let token = Self::generate_token();
                tokens.insert(
                    jwt_id.to_string(),
                    CsrfTokenData {
                        token: token.clone(),
                        created_at: Instant::now(),
                    },
                );
                token
            }
        }
    }

    /// Validate a submitted token and renew its expiry window on success.
    pub fn validate_and_renew_token(&self, token: &str, jwt_id: &str) -> bool {
        let mut tokens = self
            .tokens
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let valid = match tokens.get(jwt_id) {
            Some(data) => data.created_at.elapsed() < self.expiry && data.token == token,
            None => false,
        };
        if valid && let Some(data) = tokens.get_mut(jwt_id) {
            data.created_at = Instant::now();
        }
        valid
    }

    pub fn remove_session(&self, jwt_id: &str) {
        let mut tokens = self
            .tokens
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        tokens.remove(jwt_id);
    }
}

impl Default for CsrfTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

pub enum CsrfTokenOutcome {
    Authorized { jwt_id: String, token: String },
    Unauthorized,
}

/// Get or refresh a CSRF token for the request's authenticated session.
pub fn issue_csrf_token(req: &HttpRequest, csrf_store: &CsrfTokenStore) -> CsrfTokenOutcome {
    match req.jwt_id() {
        Some(jwt_id) => {
            let token = csrf_store.get_or_refresh_token(&jwt_id);
            CsrfTokenOutcome::Authorized { jwt_id, token }
        }
        None => CsrfTokenOutcome::Unauthorized,
    }
}

/// Validate a submitted CSRF token against the request's session.
pub fn validate_csrf_token(
    req: &HttpRequest,
    csrf_store: &CsrfTokenStore,
    token: &str,
) -> bool {
    match req.jwt_id() {
        Some(jwt_id) => csrf_store.validate_and_renew_token(token, &jwt_id),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_stable_per_session_until_refresh() {
        let store = CsrfTokenStore::new();
        let first = store.get_or_refresh_token("jwt-1");
        let second = store.get_or_refresh_token("jwt-1");
        assert_eq!(first, second);
        assert_ne!(first, store.get_or_refresh_token("jwt-2"));
    }

    #[test]
    fn validation_requires_matching_session_and_token() {
        let store = CsrfTokenStore::new();
        let token = store.get_or_refresh_token("jwt-1");

        assert!(store.validate_and_renew_token(&token, "jwt-1"));
        assert!(!store.validate_and_renew_token(&token, "jwt-2"));
        assert!(!store.validate_and_renew_token("forged", "jwt-1"));
    }

    #[test]
    fn removed_session_no_longer_validates() {
        let store = CsrfTokenStore::new();
        let token = store.get_or_refresh_token("jwt-1");
        store.remove_session("jwt-1");
        assert!(!store.validate_and_renew_token(&token, "jwt-1"));
    }
}
