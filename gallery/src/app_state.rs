// This file is part of the product NoPressure Gallery.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::sync::Arc;

use crate::assets::{
    AssetRepository, FsMediaStorage, MediaStorage, RepositoryError, YamlAssetRepository,
};
use crate::public::error::ErrorRenderer;
use crate::runtime_paths::RuntimePaths;
use crate::templates::{MiniJinjaEngine, TemplateEngine};

pub struct AppState {
    pub templates: Arc<dyn TemplateEngine>,
    pub error_renderer: ErrorRenderer,
    pub runtime_paths: RuntimePaths,
    pub assets: Arc<dyn AssetRepository>,
    pub media: Arc<dyn MediaStorage>,
}

impl AppState {
    pub fn new(
        app_name: &str,
        runtime_paths: RuntimePaths,
        assets: Arc<dyn AssetRepository>,
        media: Arc<dyn MediaStorage>,
    ) -> Self {
        Self {
            templates: Arc::new(MiniJinjaEngine::new()),
            error_renderer: ErrorRenderer::new(app_name.to_string()),
            runtime_paths,
            assets,
            media,
        }
    }

    /// State backed by the runtime root: `state/assets.yaml` and `media/`.
    pub fn open(app_name: &str, runtime_paths: RuntimePaths) -> Result<Self, RepositoryError> {
        let assets = Arc::new(YamlAssetRepository::open(
            runtime_paths.assets_file.clone(),
        )?);
        let media = Arc::new(FsMediaStorage::new(runtime_paths.media_dir.clone()));
        Ok(Self::new(app_name, runtime_paths, assets, media))
    }
}
