// This file is part of the product NoPressure Gallery.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::assets::Asset;
use crate::gallery::{FormErrors, ListingQuery, Page};
use crate::public::flash::FlashMessage;
use minijinja::{Value, context};
use serde::Serialize;

pub const GALLERY_PAGE_TITLE: &str = "Главная Галерея";
const UPLOAD_PAGE_TITLE: &str = "Загрузка модели";
const ABOUT_PAGE_TITLE: &str = "О проекте";

/// An asset as the listing template sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetCard {
    pub id: u64,
    pub title: String,
    pub image_url: String,
    pub created_at: String,
}

impl From<Asset> for AssetCard {
    fn from(asset: Asset) -> Self {
        Self {
            id: asset.id,
            image_url: asset.image_url(),
            created_at: asset.created_at.format("%d.%m.%Y %H:%M").to_string(),
            title: asset.title,
        }
    }
}

/// Fields every page layout needs.
#[derive(Debug, Clone)]
pub struct LayoutContext {
    app_name: String,
    app_description: String,
    messages: Vec<FlashMessage>,
}

impl LayoutContext {
    pub fn new(app_name: &str, app_description: &str, messages: Vec<FlashMessage>) -> Self {
        Self {
            app_name: app_name.to_string(),
            app_description: app_description.to_string(),
            messages,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GalleryIndexContext {
    layout: LayoutContext,
    page: Page<AssetCard>,
    query: ListingQuery,
    raw_query: String,
}

impl GalleryIndexContext {
    pub fn new(
        layout: LayoutContext,
        page: Page<Asset>,
        query: ListingQuery,
        raw_query: &str,
    ) -> Self {
        Self {
            layout,
            page: page.map(AssetCard::from),
            query,
            raw_query: raw_query.to_string(),
        }
    }

    pub fn to_value(&self) -> Value {
        let days = self.query.days.map(|days| days.to_string()).unwrap_or_default();
        context! {
            app_name => &self.layout.app_name,
            app_description => &self.layout.app_description,
            messages => Value::from_serialize(&self.layout.messages),
            page_title => GALLERY_PAGE_TITLE,
            nav => "gallery",
            page => Value::from_serialize(&self.page),
            search => &self.query.search,
            ordering => self.query.ordering.as_str(),
            days => days,
            query => &self.raw_query
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadFormContext {
    layout: LayoutContext,
    title: String,
    errors: FormErrors,
    max_file_size_mb: u64,
}

impl UploadFormContext {
    pub fn new(layout: LayoutContext, max_file_size_mb: u64) -> Self {
        Self {
            layout,
            title: String::new(),
            errors: FormErrors::default(),
            max_file_size_mb,
        }
    }

    pub fn with_submission(mut self, title: &str, errors: FormErrors) -> Self {
        self.title = title.to_string();
        self.errors = errors;
        self
    }

    pub fn to_value(&self) -> Value {
        context! {
            app_name => &self.layout.app_name,
            app_description => &self.layout.app_description,
            messages => Value::from_serialize(&self.layout.messages),
            page_title => UPLOAD_PAGE_TITLE,
            nav => "upload",
            title => &self.title,
            errors => Value::from_serialize(&self.errors),
            has_errors => !self.errors.is_empty(),
            max_file_size_mb => self.max_file_size_mb
        }
    }
}

#[derive(Debug, Clone)]
pub struct AboutContext {
    layout: LayoutContext,
}

impl AboutContext {
    pub fn new(layout: LayoutContext) -> Self {
        Self { layout }
    }

    pub fn to_value(&self) -> Value {
        context! {
            app_name => &self.layout.app_name,
            app_description => &self.layout.app_description,
            messages => Value::from_serialize(&self.layout.messages),
            page_title => ABOUT_PAGE_TITLE,
            nav => "about"
        }
    }
}

#[derive(Debug, Clone)]
pub struct ErrorPageContext {
    app_name: String,
}

impl ErrorPageContext {
    pub fn new(app_name: &str) -> Self {
        Self {
            app_name: app_name.to_string(),
        }
    }

    pub fn to_value(&self) -> Value {
        context! {
            app_name => &self.app_name,
            app_description => "",
            messages => Value::from(Vec::<Value>::new())
        }
    }
}
