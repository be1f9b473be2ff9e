// This file is part of the product NoPressure Gallery.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::yaml_store::{YamlFile, YamlStoreError};
use super::{Asset, NewAsset};
use chrono::Utc;
use log::debug;
use std::collections::HashSet;
use std::error::Error;
use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;

#[derive(Debug)]
pub enum RepositoryError {
    Store(YamlStoreError),
    Corrupt(String),
    Poisoned,
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryError::Store(err) => write!(f, "Asset store error: {}", err),
            RepositoryError::Corrupt(msg) => write!(f, "Asset store is corrupt: {}", msg),
            RepositoryError::Poisoned => write!(f, "Asset store lock poisoned"),
        }
    }
}

impl Error for RepositoryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RepositoryError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<YamlStoreError> for RepositoryError {
    fn from(err: YamlStoreError) -> Self {
        RepositoryError::Store(err)
    }
}

/// Persistence for assets: a consistent snapshot for readers and an atomic
/// single-record insert for the upload path.
pub trait AssetRepository: Send + Sync {
    /// All assets in insertion order.
    fn all(&self) -> Result<Vec<Asset>, RepositoryError>;

    /// Persists `asset`, assigning the next id and a creation timestamp that
    /// is never earlier than the previous insert's.
    fn insert(&self, asset: NewAsset) -> Result<Asset, RepositoryError>;
}

pub struct YamlAssetRepository {
    file: YamlFile,
    assets: Mutex<Vec<Asset>>,
}

impl YamlAssetRepository {
    pub fn open(path: PathBuf) -> Result<Self, RepositoryError> {
        let file = YamlFile::new(path, "asset");
        let assets: Vec<Asset> = file.read()?.unwrap_or_default();

        let mut seen = HashSet::with_capacity(assets.len());
        for asset in &assets {
            if !seen.insert(asset.id) {
                return Err(RepositoryError::Corrupt(format!(
                    "duplicate asset id {} in {}",
                    asset.id,
                    file.path().display()
                )));
            }
        }

        debug!(
            "Loaded {} assets from {}",
            assets.len(),
            file.path().display()
        );

        Ok(Self {
            file,
            assets: Mutex::new(assets),
        })
    }
}

impl AssetRepository for YamlAssetRepository {
    fn all(&self) -> Result<Vec<Asset>, RepositoryError> {
        let assets = self.assets.lock().map_err(|_| RepositoryError::Poisoned)?;
        Ok(assets.clone())
    }

    fn insert(&self, asset: NewAsset) -> Result<Asset, RepositoryError> {
        let mut assets = self.assets.lock().map_err(|_| RepositoryError::Poisoned)?;

        let id = assets.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        let now = Utc::now();
        let created_at = match assets.iter().map(|a| a.created_at).max() {
            Some(latest) if latest > now => latest,
            _ => now,
        };

        let stored = Asset {
            id,
            title: asset.title,
            image: asset.image,
            created_at,
        };

        let mut next = assets.clone();
        next.push(stored.clone());
        self.file.write(&next)?;
        *assets = next;

        Ok(stored)
    }
}
