// This file is part of the product NoPressure Gallery.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const MAX_TEMP_ATTEMPTS: u32 = 100;

#[derive(Debug)]
pub struct YamlStoreError {
    message: String,
}

impl YamlStoreError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for YamlStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for YamlStoreError {}

/// A YAML document on disk that is replaced atomically on every write.
#[derive(Debug, Clone)]
pub(crate) struct YamlFile {
    path: PathBuf,
    label: &'static str,
}

impl YamlFile {
    pub(crate) fn new(path: PathBuf, label: &'static str) -> Self {
        Self { path, label }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `None` when the file is missing or blank.
    pub(crate) fn read<T: DeserializeOwned>(&self) -> Result<Option<T>, YamlStoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path).map_err(|err| {
            YamlStoreError::new(format!("Failed to read {} file: {}", self.label, err))
        })?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        serde_yaml::from_str(&content).map(Some).map_err(|err| {
            YamlStoreError::new(format!("Failed to parse {} file: {}", self.label, err))
        })
    }

    pub(crate) fn write<T: Serialize>(&self, value: &T) -> Result<(), YamlStoreError> {
        let content = serde_yaml::to_string(value).map_err(|err| {
            YamlStoreError::new(format!("Failed to serialize {}: {}", self.label, err))
        })?;
        let parent = self.path.parent().ok_or_else(|| {
            YamlStoreError::new(format!("{} file path has no parent directory", self.label))
        })?;
        let (mut file, temp_path) = self.create_temp_file(parent)?;

        let written = file
            .write_all(content.as_bytes())
            .and_then(|_| file.sync_all())
            .and_then(|_| fs::rename(&temp_path, &self.path));
        if let Err(err) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(YamlStoreError::new(format!(
                "Failed to replace {} file: {}",
                self.label, err
            )));
        }

        #[cfg(unix)]
        {
            if let Err(err) = fs::File::open(parent).and_then(|dir| dir.sync_all()) {
                log::warn!("{} directory sync failed: {}", self.label, err);
            }
        }

        Ok(())
    }

    fn create_temp_file(&self, parent: &Path) -> Result<(fs::File, PathBuf), YamlStoreError> {
        let file_name = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                YamlStoreError::new(format!("{} file name is not valid UTF-8", self.label))
            })?;
        for attempt in 0..MAX_TEMP_ATTEMPTS {
            let temp_path = parent.join(format!(
                ".{}.tmp.{}.{}",
                file_name,
                std::process::id(),
                attempt
            ));
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&temp_path)
            {
                Ok(file) => return Ok((file, temp_path)),
                Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(err) => {
                    return Err(YamlStoreError::new(format!(
                        "Failed to create temp {} file: {}",
                        self.label, err
                    )));
                }
            }
        }
        Err(YamlStoreError::new(format!(
            "Failed to create temp {} file after multiple attempts",
            self.label
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_fixtures::TestFixtureRoot;

    #[test]
    fn missing_and_blank_files_read_as_none() {
        let fixture = TestFixtureRoot::new_unique("yaml-file-blank").unwrap();
        let file = YamlFile::new(fixture.path().join("list.yaml"), "list");
        assert_eq!(file.read::<Vec<String>>().unwrap(), None);

        fs::write(file.path(), "  \n").unwrap();
        assert_eq!(file.read::<Vec<String>>().unwrap(), None);
    }

    #[test]
    fn write_replaces_content_without_leaving_temp_files() {
        let fixture = TestFixtureRoot::new_unique("yaml-file-write").unwrap();
        let file = YamlFile::new(fixture.path().join("list.yaml"), "list");

        file.write(&vec!["one".to_string()]).unwrap();
        file.write(&vec!["one".to_string(), "two".to_string()]).unwrap();

        let stored: Vec<String> = file.read().unwrap().expect("stored list");
        assert_eq!(stored, vec!["one", "two"]);

        let leftovers: Vec<_> = fs::read_dir(fixture.path())
            .unwrap()
            .flatten()
            .filter(|entry| entry.file_name().to_string_lossy().contains(".tmp."))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn parse_errors_name_the_label() {
        let fixture = TestFixtureRoot::new_unique("yaml-file-corrupt").unwrap();
        let file = YamlFile::new(fixture.path().join("list.yaml"), "asset");
        fs::write(file.path(), "[unterminated").unwrap();
        let err = file.read::<Vec<String>>().expect_err("corrupt yaml");
        assert!(err.to_string().contains("Failed to parse asset file"));
    }
}
