// This file is part of the product NoPressure Gallery.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::pagination::{PAGE_SIZE, Page, paginate};
use super::query_params::QueryParams;
use crate::assets::Asset;
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    Title,
}

impl SortOrder {
    /// Unknown values fall back to newest first.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("old") => SortOrder::Oldest,
            Some("name") => SortOrder::Title,
            _ => SortOrder::Newest,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Newest => "new",
            SortOrder::Oldest => "old",
            SortOrder::Title => "name",
        }
    }
}

/// The listing request after permissive parsing; nothing here can fail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingQuery {
    pub search: String,
    pub ordering: SortOrder,
    pub days: Option<u64>,
    pub page: Option<String>,
}

impl ListingQuery {
    pub fn from_params(params: &QueryParams) -> Self {
        Self {
            search: params.get("q").unwrap_or_default().to_string(),
            ordering: SortOrder::parse(params.get("ordering")),
            days: parse_days(params.get("days")),
            page: params.get("page").map(str::to_string),
        }
    }
}

/// Accepts only plain digit strings. Values too large for `u64` saturate,
/// which later means "no lower bound".
pub fn parse_days(raw: Option<&str>) -> Option<u64> {
    let raw = raw?;
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(raw.parse::<u64>().unwrap_or(u64::MAX))
}

pub fn filter_recent(assets: Vec<Asset>, days: Option<u64>, now: DateTime<Utc>) -> Vec<Asset> {
    let Some(days) = days else {
        return assets;
    };
    let cutoff = i64::try_from(days)
        .ok()
        .and_then(Duration::try_days)
        .and_then(|span| now.checked_sub_signed(span));
    match cutoff {
        Some(cutoff) => assets
            .into_iter()
            .filter(|asset| asset.created_at >= cutoff)
            .collect(),
        None => assets,
    }
}

pub fn filter_by_title(assets: Vec<Asset>, search: &str) -> Vec<Asset> {
    if search.is_empty() {
        return assets;
    }
    let needle = search.to_lowercase();
    assets
        .into_iter()
        .filter(|asset| asset.title.to_lowercase().contains(&needle))
        .collect()
}

/// Stable: ties keep their incoming (insertion) order.
pub fn sort_assets(mut assets: Vec<Asset>, ordering: SortOrder) -> Vec<Asset> {
    match ordering {
        SortOrder::Newest => assets.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortOrder::Oldest => assets.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortOrder::Title => assets.sort_by(|a, b| a.title.cmp(&b.title)),
    }
    assets
}

/// Date filter, then title search, then ordering, then the page cut.
pub fn build_listing(assets: Vec<Asset>, query: &ListingQuery, now: DateTime<Utc>) -> Page<Asset> {
    let recent = filter_recent(assets, query.days, now);
    let matching = filter_by_title(recent, &query.search);
    let ordered = sort_assets(matching, query.ordering);
    paginate(ordered, PAGE_SIZE, query.page.as_deref())
}
