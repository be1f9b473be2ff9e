// This file is part of the product NoPressure Gallery.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod media;
pub mod repository;
mod yaml_store;

pub use media::{ASSET_UPLOAD_DIR, FsMediaStorage, MediaError, MediaStorage, sanitize_file_name};
pub use repository::{AssetRepository, RepositoryError, YamlAssetRepository};

/// A persisted gallery item. Created once by an upload, never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: u64,
    pub title: String,
    /// Path of the stored image, relative to the media root.
    pub image: String,
    pub created_at: DateTime<Utc>,
}

impl Asset {
    pub fn image_url(&self) -> String {
        format!("/media/{}", self.image)
    }
}

/// An asset that has not been persisted yet; the repository assigns
/// `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAsset {
    pub title: String,
    pub image: String,
}
