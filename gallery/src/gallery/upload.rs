// This file is part of the product NoPressure Gallery.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::assets::{
    Asset, AssetRepository, MediaError, MediaStorage, NewAsset, RepositoryError, sanitize_file_name,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use log::{info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt;

pub const MAX_TITLE_CHARS: usize = 200;

const DATA_PREFIX: &str = "data:";
const BASE64_SEPARATOR: &str = ";base64,";

const REQUIRED_FIELD: &str = "Обязательное поле.";
const IMAGE_REQUIRED: &str = "Загрузите изображение или сделайте снимок.";
const NOT_AN_IMAGE: &str = "Загрузите корректное изображение.";
const INVALID_FILE_NAME: &str = "Недопустимое имя файла.";
const CAPTURE_UNREADABLE: &str = "Не удалось прочитать снимок с камеры.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Raw submission of the upload form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadForm {
    pub title: String,
    pub image: Option<UploadedFile>,
    pub image_data: Option<String>,
    /// Set when the body exceeded the configured upload limit.
    pub oversized_limit_mb: Option<u64>,
}

/// Per-field messages shown next to the form inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors {
    pub title: Vec<String>,
    pub image: Vec<String>,
    pub image_data: Vec<String>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.image.is_empty() && self.image_data.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    MissingSeparator,
    MissingExtension,
    InvalidExtension(String),
    InvalidPayload(String),
    NotAnImage(String),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::MissingSeparator => write!(f, "image data has no ';base64,' separator"),
            DecodeError::MissingExtension => write!(f, "image data header names no subtype"),
            DecodeError::InvalidExtension(ext) => {
                write!(f, "image data subtype {:?} is not a usable extension", ext)
            }
            DecodeError::InvalidPayload(msg) => write!(f, "image data is not valid base64: {}", msg),
            DecodeError::NotAnImage(media_type) => {
                write!(f, "image data declared as {:?} is not that image type", media_type)
            }
        }
    }
}

impl Error for DecodeError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub extension: String,
    pub bytes: Vec<u8>,
}

/// Decodes `data:image/png;base64,<payload>`. The extension is whatever
/// follows the last `/` of the header. The decoded bytes must sniff as the
/// image type the header declares.
pub fn decode_image_data(raw: &str) -> Result<DecodedImage, DecodeError> {
    let (header, payload) = raw
        .split_once(BASE64_SEPARATOR)
        .ok_or(DecodeError::MissingSeparator)?;
    let media_type = header.strip_prefix(DATA_PREFIX).unwrap_or(header);

    let (_, extension) = header
        .rsplit_once('/')
        .ok_or(DecodeError::MissingExtension)?;
    if extension.is_empty() {
        return Err(DecodeError::MissingExtension);
    }
    if !extension
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    {
        return Err(DecodeError::InvalidExtension(extension.to_string()));
    }

    let bytes = BASE64
        .decode(payload.trim())
        .map_err(|err| DecodeError::InvalidPayload(err.to_string()))?;

    if !sniffs_as(&bytes, media_type) {
        return Err(DecodeError::NotAnImage(media_type.to_string()));
    }

    Ok(DecodedImage {
        extension: extension.to_ascii_lowercase(),
        bytes,
    })
}

fn sniffs_as(bytes: &[u8], media_type: &str) -> bool {
    match infer::get(bytes) {
        Some(kind) => {
            kind.matcher_type() == infer::MatcherType::Image
                && kind.mime_type().eq_ignore_ascii_case(media_type)
        }
        None => false,
    }
}

pub fn thumb_file_name(title: &str, extension: &str) -> String {
    format!("{}_thumb.{}", title, extension)
}

pub fn success_message(title: &str) -> String {
    format!("Модель \"{}\" успешно загружена!", title)
}

/// A submission that passed validation: everything needed to write the
/// image and the asset record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidUpload {
    pub title: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadForm {
    /// Checks every field and decodes an inline capture. An inline capture
    /// wins over an uploaded file; a broken capture is a field error.
    pub fn validate(self) -> Result<ValidUpload, FormErrors> {
        let mut errors = FormErrors::default();

        let title = self.title.trim().to_string();
        if title.is_empty() {
            errors.title.push(REQUIRED_FIELD.to_string());
        } else if title.chars().count() > MAX_TITLE_CHARS {
            errors.title.push(format!(
                "Название должно быть не длиннее {} символов.",
                MAX_TITLE_CHARS
            ));
        }

        if let Some(limit) = self.oversized_limit_mb {
            errors
                .image
                .push(format!("Размер загрузки превышает {} МБ.", limit));
            return Err(errors);
        }

        let image_data = self.image_data.filter(|data| !data.trim().is_empty());
        let image = self.image.filter(|file| !file.bytes.is_empty());

        let source = match (image_data, image) {
            (Some(data), _) => match decode_image_data(&data) {
                Ok(decoded) => Some(ImageSource::Capture(decoded)),
                Err(err) => {
                    warn!("Rejected camera capture: {}", err);
                    errors.image_data.push(CAPTURE_UNREADABLE.to_string());
                    None
                }
            },
            (None, Some(file)) => {
                if infer::is_image(&file.bytes) {
                    Some(ImageSource::File(file))
                } else {
                    errors.image.push(NOT_AN_IMAGE.to_string());
                    None
                }
            }
            (None, None) => {
                errors.image.push(IMAGE_REQUIRED.to_string());
                None
            }
        };

        let (file_name, bytes) = match source {
            Some(ImageSource::Capture(decoded)) => {
                (thumb_file_name(&title, &decoded.extension), decoded.bytes)
            }
            Some(ImageSource::File(file)) => (file.file_name, file.bytes),
            None => return Err(errors),
        };

        if sanitize_file_name(&file_name).is_none() {
            errors.image.push(INVALID_FILE_NAME.to_string());
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ValidUpload {
            title,
            file_name,
            bytes,
        })
    }
}

enum ImageSource {
    Capture(DecodedImage),
    File(UploadedFile),
}

#[derive(Debug)]
pub enum UploadError {
    Media(MediaError),
    Repository(RepositoryError),
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::Media(err) => write!(f, "Failed to store image: {}", err),
            UploadError::Repository(err) => write!(f, "Failed to save asset: {}", err),
        }
    }
}

impl Error for UploadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            UploadError::Media(err) => Some(err),
            UploadError::Repository(err) => Some(err),
        }
    }
}

impl From<MediaError> for UploadError {
    fn from(err: MediaError) -> Self {
        UploadError::Media(err)
    }
}

impl From<RepositoryError> for UploadError {
    fn from(err: RepositoryError) -> Self {
        UploadError::Repository(err)
    }
}

/// Writes the image, then the asset record. If the record cannot be saved
/// the image is removed again so no orphan file is left behind.
pub fn store_upload(
    upload: ValidUpload,
    repository: &dyn AssetRepository,
    media: &dyn MediaStorage,
) -> Result<Asset, UploadError> {
    let image = media.save(&upload.file_name, &upload.bytes)?;

    match repository.insert(NewAsset {
        title: upload.title,
        image: image.clone(),
    }) {
        Ok(asset) => {
            info!("Stored asset {} \"{}\" as {}", asset.id, asset.title, image);
            Ok(asset)
        }
        Err(err) => {
            if let Err(cleanup) = media.remove(&image) {
                warn!("Failed to remove orphaned image {}: {}", image, cleanup);
            }
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::path::PathBuf;
    use std::sync::Mutex;

    const PNG_BYTES: &[u8] = &[
        0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D',
        b'R',
    ];

    #[derive(Default)]
    struct RecordingMedia {
        saved: Mutex<Vec<(String, Vec<u8>)>>,
        removed: Mutex<Vec<String>>,
    }

    impl MediaStorage for RecordingMedia {
        fn save(&self, file_name: &str, bytes: &[u8]) -> Result<String, MediaError> {
            let reference = format!("assets/{}", file_name);
            self.saved
                .lock()
                .unwrap()
                .push((reference.clone(), bytes.to_vec()));
            Ok(reference)
        }

        fn remove(&self, reference: &str) -> Result<(), MediaError> {
            self.removed.lock().unwrap().push(reference.to_string());
            Ok(())
        }

        fn resolve(&self, _reference: &str) -> Option<PathBuf> {
            None
        }
    }

    #[derive(Default)]
    struct MemoryRepository {
        assets: Mutex<Vec<Asset>>,
        fail: bool,
    }

    impl AssetRepository for MemoryRepository {
        fn all(&self) -> Result<Vec<Asset>, RepositoryError> {
            Ok(self.assets.lock().unwrap().clone())
        }

        fn insert(&self, asset: NewAsset) -> Result<Asset, RepositoryError> {
            if self.fail {
                return Err(RepositoryError::Poisoned);
            }
            let mut assets = self.assets.lock().unwrap();
            let stored = Asset {
                id: assets.len() as u64 + 1,
                title: asset.title,
                image: asset.image,
                created_at: Utc::now(),
            };
            assets.push(stored.clone());
            Ok(stored)
        }
    }

    fn capture(bytes: &[u8]) -> String {
        format!("data:image/png;base64,{}", BASE64.encode(bytes))
    }

    fn form(title: &str) -> UploadForm {
        UploadForm {
            title: title.to_string(),
            ..UploadForm::default()
        }
    }

    #[test]
    fn decode_extracts_extension_and_bytes() {
        let decoded = decode_image_data(&capture(PNG_BYTES)).unwrap();
        assert_eq!(decoded.extension, "png");
        assert_eq!(decoded.bytes, PNG_BYTES);

        let jpeg_bytes = [0xFF, 0xD8, 0xFF, 0xE0];
        let jpeg =
            decode_image_data(&format!("data:image/jpeg;base64,{}", BASE64.encode(jpeg_bytes)))
                .unwrap();
        assert_eq!(jpeg.extension, "jpeg");
        assert_eq!(jpeg.bytes, jpeg_bytes);
    }

    #[test]
    fn decode_rejects_payloads_that_are_not_the_declared_image() {
        let script = BASE64.encode("<script>alert(document.cookie)</script>");
        assert_eq!(
            decode_image_data(&format!("data:text/html;base64,{}", script)),
            Err(DecodeError::NotAnImage("text/html".to_string()))
        );
        assert_eq!(
            decode_image_data(&format!("data:image/png;base64,{}", script)),
            Err(DecodeError::NotAnImage("image/png".to_string()))
        );
        assert_eq!(
            decode_image_data(&format!("data:image/html;base64,{}", BASE64.encode(PNG_BYTES))),
            Err(DecodeError::NotAnImage("image/html".to_string()))
        );
    }

    #[test]
    fn html_capture_is_a_field_error() {
        let errors = UploadForm {
            image_data: Some(format!(
                "data:text/html;base64,{}",
                BASE64.encode("<script>alert(1)</script>")
            )),
            ..form("Foo")
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.image_data, vec![CAPTURE_UNREADABLE.to_string()]);
    }

    #[test]
    fn decode_rejects_malformed_input() {
        assert_eq!(
            decode_image_data("data:image/png,AAEC"),
            Err(DecodeError::MissingSeparator)
        );
        assert_eq!(
            decode_image_data("data:image/;base64,AAEC"),
            Err(DecodeError::MissingExtension)
        );
        assert_eq!(
            decode_image_data("data:png;base64,AAEC"),
            Err(DecodeError::MissingExtension)
        );
        assert!(matches!(
            decode_image_data("data:image/p?g;base64,AAEC"),
            Err(DecodeError::InvalidExtension(_))
        ));
        assert!(matches!(
            decode_image_data("data:image/png;base64,***not base64***"),
            Err(DecodeError::InvalidPayload(_))
        ));
        assert!(matches!(
            decode_image_data("data:image/png;base64,AAE"),
            Err(DecodeError::InvalidPayload(_))
        ));
    }

    #[test]
    fn capture_upload_is_named_after_title() {
        let upload = UploadForm {
            image_data: Some(capture(PNG_BYTES)),
            ..form("  Foo ")
        }
        .validate()
        .unwrap();

        assert_eq!(upload.title, "Foo");
        assert_eq!(upload.file_name, "Foo_thumb.png");
        assert_eq!(upload.bytes, PNG_BYTES);
    }

    #[test]
    fn capture_wins_over_file() {
        let upload = UploadForm {
            image_data: Some(capture(PNG_BYTES)),
            image: Some(UploadedFile {
                file_name: "other.png".to_string(),
                content_type: Some("image/png".to_string()),
                bytes: PNG_BYTES.to_vec(),
            }),
            ..form("Foo")
        }
        .validate()
        .unwrap();
        assert_eq!(upload.file_name, "Foo_thumb.png");
    }

    #[test]
    fn file_upload_keeps_its_name() {
        let upload = UploadForm {
            image: Some(UploadedFile {
                file_name: "photo.png".to_string(),
                content_type: None,
                bytes: PNG_BYTES.to_vec(),
            }),
            ..form("Photo")
        }
        .validate()
        .unwrap();
        assert_eq!(upload.file_name, "photo.png");
    }

    #[test]
    fn missing_image_and_title_are_both_reported() {
        let errors = form("   ").validate().unwrap_err();
        assert_eq!(errors.title, vec![REQUIRED_FIELD.to_string()]);
        assert_eq!(errors.image, vec![IMAGE_REQUIRED.to_string()]);
        assert!(errors.image_data.is_empty());
    }

    #[test]
    fn empty_file_part_counts_as_missing() {
        let errors = UploadForm {
            image: Some(UploadedFile {
                file_name: String::new(),
                content_type: None,
                bytes: Vec::new(),
            }),
            image_data: Some(String::new()),
            ..form("Foo")
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.image, vec![IMAGE_REQUIRED.to_string()]);
    }

    #[test]
    fn malformed_capture_is_a_field_error() {
        let errors = UploadForm {
            image_data: Some("data:image/png;base64,@@@".to_string()),
            ..form("Foo")
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.image_data, vec![CAPTURE_UNREADABLE.to_string()]);
        assert!(errors.title.is_empty());
    }

    #[test]
    fn non_image_files_are_rejected() {
        let errors = UploadForm {
            image: Some(UploadedFile {
                file_name: "notes.txt".to_string(),
                content_type: Some("text/plain".to_string()),
                bytes: b"just text".to_vec(),
            }),
            ..form("Foo")
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.image, vec![NOT_AN_IMAGE.to_string()]);
    }

    #[test]
    fn overlong_title_is_rejected() {
        let errors = UploadForm {
            image_data: Some(capture(PNG_BYTES)),
            ..form(&"я".repeat(MAX_TITLE_CHARS + 1))
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.title.len(), 1);
    }

    #[test]
    fn oversized_body_is_an_image_error() {
        let errors = UploadForm {
            oversized_limit_mb: Some(10),
            ..form("Foo")
        }
        .validate()
        .unwrap_err();
        assert!(errors.image[0].contains("10"));
    }

    #[test]
    fn store_writes_one_file_and_one_record() {
        let media = RecordingMedia::default();
        let repository = MemoryRepository::default();
        let upload = ValidUpload {
            title: "Foo".to_string(),
            file_name: "Foo_thumb.png".to_string(),
            bytes: PNG_BYTES.to_vec(),
        };

        let asset = store_upload(upload, &repository, &media).unwrap();

        assert_eq!(asset.image, "assets/Foo_thumb.png");
        assert_eq!(asset.title, "Foo");
        assert_eq!(media.saved.lock().unwrap().len(), 1);
        assert_eq!(repository.all().unwrap().len(), 1);
        assert_eq!(success_message(&asset.title), "Модель \"Foo\" успешно загружена!");
    }

    #[test]
    fn failed_insert_removes_the_written_file() {
        let media = RecordingMedia::default();
        let repository = MemoryRepository {
            fail: true,
            ..MemoryRepository::default()
        };
        let upload = ValidUpload {
            title: "Foo".to_string(),
            file_name: "Foo_thumb.png".to_string(),
            bytes: PNG_BYTES.to_vec(),
        };

        let err = store_upload(upload, &repository, &media).unwrap_err();
        assert!(matches!(err, UploadError::Repository(_)));
        assert_eq!(
            media.removed.lock().unwrap().as_slice(),
            ["assets/Foo_thumb.png".to_string()]
        );
    }
}
