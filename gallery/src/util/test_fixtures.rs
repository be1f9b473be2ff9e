// This file is part of the product NoPressure Gallery.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::assets::{ASSET_UPLOAD_DIR, Asset};
use crate::bootstrap::config::default_config_yaml;
use crate::config::CONFIG_FILE_NAME;
use crate::runtime_paths::{ASSETS_FILE_NAME, RuntimePaths};

/// A throwaway runtime root under `target/test-fixtures`, removed on drop.
#[derive(Debug)]
pub struct TestFixtureRoot {
    path: PathBuf,
}

impl TestFixtureRoot {
    pub fn new_fixed(name: &str) -> std::io::Result<Self> {
        let root = fixtures_root().join(name);
        if root.exists() {
            fs::remove_dir_all(&root)?;
        }
        fs::create_dir_all(&root)?;
        Ok(Self { path: root })
    }

    pub fn new_unique(prefix: &str) -> std::io::Result<Self> {
        let name = format!("{}-{}", prefix, Uuid::new_v4());
        Self::new_fixed(&name)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state_dir(&self) -> PathBuf {
        self.path.join("state")
    }

    pub fn media_dir(&self) -> PathBuf {
        self.path.join("media")
    }

    pub fn assets_file(&self) -> PathBuf {
        self.state_dir().join(ASSETS_FILE_NAME)
    }

    pub fn write_config(&self, yaml: &str) -> std::io::Result<()> {
        fs::write(self.path.join(CONFIG_FILE_NAME), yaml)
    }

    pub fn write_default_config(&self) -> std::io::Result<()> {
        self.write_config(&default_config_yaml())
    }

    /// Seeds `state/assets.yaml` directly, bypassing the repository.
    pub fn write_assets(&self, assets: &[Asset]) -> std::io::Result<()> {
        fs::create_dir_all(self.state_dir())?;
        let yaml = serde_yaml::to_string(assets).map_err(std::io::Error::other)?;
        fs::write(self.assets_file(), yaml)
    }

    /// Names of the files stored below `media/assets`.
    pub fn stored_media(&self) -> std::io::Result<Vec<String>> {
        let dir = self.media_dir().join(ASSET_UPLOAD_DIR);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            names.push(entry?.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    /// Full runtime layout, writing the default config first if needed.
    pub fn runtime_paths(&self) -> std::io::Result<RuntimePaths> {
        if !self.path.join(CONFIG_FILE_NAME).exists() {
            self.write_default_config()?;
        }
        RuntimePaths::from_root(&self.path).map_err(std::io::Error::other)
    }
}

impl Drop for TestFixtureRoot {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn fixtures_root() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let repo_root = manifest_dir.parent().unwrap_or(&manifest_dir);
    repo_root.join("target").join("test-fixtures")
}
