// This file is part of the product NoPressure Gallery.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Request-independent gallery logic: the listing pipeline, pagination,
//! query string rewriting and upload validation.

pub mod listing;
pub mod pagination;
pub mod query_params;
pub mod upload;

pub use listing::{ListingQuery, SortOrder, build_listing};
pub use pagination::{PAGE_SIZE, Page, paginate};
pub use query_params::{QueryParams, merge_query};
pub use upload::{
    DecodeError, FormErrors, MAX_TITLE_CHARS, UploadError, UploadForm, UploadedFile, ValidUpload,
    decode_image_data, store_upload, success_message,
};
