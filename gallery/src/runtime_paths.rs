// This file is part of the product NoPressure Gallery.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::assets::ASSET_UPLOAD_DIR;
use crate::config::{CONFIG_FILE_NAME, ConfigError};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const ASSETS_FILE_NAME: &str = "assets.yaml";

#[derive(Debug, Clone)]
pub struct RuntimePaths {
    pub root: PathBuf,
    pub config_file: PathBuf,
    pub state_dir: PathBuf,
    pub assets_file: PathBuf,
    pub media_dir: PathBuf,
}

impl RuntimePaths {
    pub fn from_root(root: &Path) -> Result<Self, ConfigError> {
        let root_path = if root.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            root.to_path_buf()
        };

        if !root_path.exists() {
            fs::create_dir_all(&root_path).map_err(|e| {
                ConfigError::ValidationError(format!(
                    "Failed to create runtime root '{}': {}",
                    root_path.display(),
                    e
                ))
            })?;
        }

        let root_canonical = canonicalize(&root_path, "runtime root")?;

        let config_file = root_canonical.join(CONFIG_FILE_NAME);
        if !config_file.is_file() {
            return Err(ConfigError::ValidationError(format!(
                "Config file is missing: {}",
                config_file.display()
            )));
        }

        let state_dir = root_canonical.join("state");
        let media_dir = root_canonical.join("media");

        ensure_dir_exists(&state_dir)?;
        ensure_dir_exists(&media_dir)?;
        ensure_dir_exists(&media_dir.join(ASSET_UPLOAD_DIR))?;

        let state_dir = canonicalize(&state_dir, "state directory")?;
        let media_dir = canonicalize(&media_dir, "media directory")?;
        let assets_file = state_dir.join(ASSETS_FILE_NAME);
        if assets_file.exists() && !assets_file.is_file() {
            return Err(ConfigError::ValidationError(format!(
                "Asset store is not a file: {}",
                assets_file.display()
            )));
        }

        Ok(Self {
            root: root_canonical,
            config_file,
            state_dir,
            assets_file,
            media_dir,
        })
    }
}

fn canonicalize(path: &Path, label: &str) -> Result<PathBuf, ConfigError> {
    path.canonicalize().map_err(|e| {
        ConfigError::ValidationError(format!(
            "Failed to canonicalize {} '{}': {}",
            label,
            path.display(),
            e
        ))
    })
}

fn ensure_dir_exists(path: &Path) -> Result<(), ConfigError> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| {
            ConfigError::ValidationError(format!(
                "Failed to create directory '{}': {}",
                path.display(),
                e
            ))
        })?;
    }

    ensure_dir_writable(path, "Directory must be writable")
}

fn ensure_dir_writable(path: &Path, context: &str) -> Result<(), ConfigError> {
    if !path.is_dir() {
        return Err(ConfigError::ValidationError(format!(
            "{} (not a directory): {}",
            context,
            path.display()
        )));
    }

    let probe_path = path.join(format!(".gallery-write-check-{}", Uuid::new_v4()));

    match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&probe_path)
    {
        Ok(_) => fs::remove_file(&probe_path).map_err(|err| {
            ConfigError::ValidationError(format!(
                "{} (unable to clean probe file {}): {}",
                context,
                probe_path.display(),
                err
            ))
        }),
        Err(err) => Err(ConfigError::ValidationError(format!(
            "{} ({}): {}",
            context,
            path.display(),
            err
        ))),
    }
}
