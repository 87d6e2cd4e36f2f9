// This file is part of the product LinkPress.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::sync::Arc;

use crate::config::ValidatedConfig;
use crate::errors::ErrorRenderer;
use crate::shlink::{ShlinkClient, ShlinkError};
use crate::templates::{MiniJinjaEngine, TemplateEngine};

pub struct AppState {
    pub templates: Arc<dyn TemplateEngine>,
    pub error_renderer: ErrorRenderer,
    pub shlink: Arc<ShlinkClient>,
}

impl AppState {
    pub fn new(config: &ValidatedConfig) -> Result<Self, ShlinkError> {
        let shlink = Arc::new(ShlinkClient::new(&config.shlink)?);
        Ok(Self {
            templates: Arc::new(MiniJinjaEngine::new()),
            error_renderer: ErrorRenderer::new(config.app_name.clone()),
            shlink,
        })
    }
}
