// This file is part of the product NoPressure Gallery.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::config::UploadConfig;
use crate::gallery::{UploadForm, UploadedFile};
use actix_multipart::{Field, Multipart, MultipartError};
use futures_util::StreamExt;
use log::{debug, warn};

/// Collects the upload form fields from a multipart body. Once the body
/// grows past the configured limit reading stops and the form is marked
/// oversized instead of failing the request.
pub async fn read_upload_form(
    mut payload: Multipart,
    limits: &UploadConfig,
) -> Result<UploadForm, MultipartError> {
    let max_bytes = limits.max_upload_bytes();
    let mut form = UploadForm::default();
    let mut total: u64 = 0;

    while let Some(field) = payload.next().await {
        let mut field = field?;
        let name = field.name().unwrap_or_default().to_string();

        let Some(bytes) = read_field(&mut field, &mut total, max_bytes).await? else {
            warn!(
                "Upload body exceeded {} MB, rejecting submission",
                limits.max_file_size_mb
            );
            form.oversized_limit_mb = Some(limits.max_file_size_mb);
            // Rest of the body is left unread; actix discards it and does
            // not keep the connection alive.
            return Ok(form);
        };

        match name.as_str() {
            "title" => form.title = String::from_utf8_lossy(&bytes).into_owned(),
            "image_data" => form.image_data = Some(String::from_utf8_lossy(&bytes).into_owned()),
            "image" => {
                let file_name = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .unwrap_or_default()
                    .to_string();
                let content_type = field.content_type().map(|mime| mime.to_string());
                form.image = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            other => debug!("Ignoring unexpected upload field {:?}", other),
        }
    }

    Ok(form)
}

/// `None` once the running total passes `max_bytes`.
async fn read_field(
    field: &mut Field,
    total: &mut u64,
    max_bytes: Option<u64>,
) -> Result<Option<Vec<u8>>, MultipartError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk?;
        *total += chunk.len() as u64;
        if let Some(max) = max_bytes
            && *total > max
        {
            return Ok(None);
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(Some(bytes))
}
