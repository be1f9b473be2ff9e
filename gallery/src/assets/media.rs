// This file is part of the product NoPressure Gallery.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use log::warn;
use std::error::Error;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

/// Directory below the media root that holds asset images.
pub const ASSET_UPLOAD_DIR: &str = "assets";

const MAX_FILE_NAME_CHARS: usize = 100;
const MAX_NAME_ATTEMPTS: u32 = 100;
const NAME_SUFFIX_CHARS: usize = 7;

#[derive(Debug)]
pub enum MediaError {
    InvalidName(String),
    Io(io::Error),
}

impl fmt::Display for MediaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaError::InvalidName(name) => write!(f, "Invalid media file name: {:?}", name),
            MediaError::Io(err) => write!(f, "Media storage I/O error: {}", err),
        }
    }
}

impl Error for MediaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MediaError::Io(err) => Some(err),
            MediaError::InvalidName(_) => None,
        }
    }
}

impl From<io::Error> for MediaError {
    fn from(err: io::Error) -> Self {
        MediaError::Io(err)
    }
}

/// File storage for uploaded images. References returned by `save` are
/// relative to the media root and are what an `Asset` stores.
pub trait MediaStorage: Send + Sync {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<String, MediaError>;

    fn remove(&self, reference: &str) -> Result<(), MediaError>;

    /// Maps a reference back to an existing file, refusing anything that
    /// would escape the media root.
    fn resolve(&self, reference: &str) -> Option<PathBuf>;
}

pub struct FsMediaStorage {
    root: PathBuf,
    upload_dir: String,
}

impl FsMediaStorage {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            upload_dir: ASSET_UPLOAD_DIR.to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn relative_path(reference: &str) -> Option<PathBuf> {
        let path = Path::new(reference);
        let mut relative = PathBuf::new();
        for component in path.components() {
            match component {
                Component::Normal(part) => relative.push(part),
                _ => return None,
            }
        }
        if relative.as_os_str().is_empty() {
            None
        } else {
            Some(relative)
        }
    }
}

impl MediaStorage for FsMediaStorage {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<String, MediaError> {
        let name = sanitize_file_name(file_name)
            .ok_or_else(|| MediaError::InvalidName(file_name.to_string()))?;
        let dir = self.root.join(&self.upload_dir);
        fs::create_dir_all(&dir)?;

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let candidate = if attempt == 0 {
                name.clone()
            } else {
                alternate_name(&name)
            };
            let path = dir.join(&candidate);
            let mut file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
            {
                Ok(file) => file,
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(err) => return Err(MediaError::Io(err)),
            };

            if let Err(err) = file.write_all(bytes).and_then(|_| file.sync_all()) {
                if let Err(cleanup) = fs::remove_file(&path) {
                    warn!(
                        "Failed to remove partial media file {}: {}",
                        path.display(),
                        cleanup
                    );
                }
                return Err(MediaError::Io(err));
            }

            return Ok(format!("{}/{}", self.upload_dir, candidate));
        }

        Err(MediaError::Io(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free file name for {}", name),
        )))
    }

    fn remove(&self, reference: &str) -> Result<(), MediaError> {
        let relative = Self::relative_path(reference)
            .ok_or_else(|| MediaError::InvalidName(reference.to_string()))?;
        fs::remove_file(self.root.join(relative))?;
        Ok(())
    }

    fn resolve(&self, reference: &str) -> Option<PathBuf> {
        let path = self.root.join(Self::relative_path(reference)?);
        if path.is_file() { Some(path) } else { None }
    }
}

/// Reduces a user supplied file name to a storage-safe one: directory parts
/// are dropped, spaces become `_` and only letters, digits, `-`, `_` and `.`
/// survive. Overlong names are shortened from the stem so the extension is
/// kept. Returns `None` when nothing usable is left.
pub fn sanitize_file_name(name: &str) -> Option<String> {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
        .replace(' ', "_");
    let cleaned: String = base
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();

    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        return None;
    }

    if cleaned.chars().count() <= MAX_FILE_NAME_CHARS {
        return Some(cleaned);
    }

    let (stem, extension) = split_extension(&cleaned);
    let keep = MAX_FILE_NAME_CHARS.saturating_sub(extension.chars().count());
    let shortened: String = stem.chars().take(keep).collect();
    if shortened.is_empty() {
        return None;
    }
    Some(format!("{}{}", shortened, extension))
}

fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(index) if index > 0 => name.split_at(index),
        _ => (name, ""),
    }
}

fn alternate_name(name: &str) -> String {
    let (stem, extension) = split_extension(name);
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(NAME_SUFFIX_CHARS)
        .collect();
    let keep = MAX_FILE_NAME_CHARS
        .saturating_sub(extension.chars().count() + NAME_SUFFIX_CHARS + 1)
        .max(1);
    let stem: String = stem.chars().take(keep).collect();
    format!("{}_{}{}", stem, suffix, extension)
}
