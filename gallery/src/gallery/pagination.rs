// This file is part of the product NoPressure Gallery.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use serde::Serialize;

/// Assets shown per gallery page.
pub const PAGE_SIZE: usize = 6;

/// One page of an ordered sequence plus what is needed to navigate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based.
    pub number: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_page_number: Option<usize>,
    pub next_page_number: Option<usize>,
}

impl<T> Page<T> {
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            total_pages: self.total_pages,
            total_items: self.total_items,
            has_previous: self.has_previous,
            has_next: self.has_next,
            previous_page_number: self.previous_page_number,
            next_page_number: self.next_page_number,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Cuts `items` into pages of `page_size` and returns the requested one.
///
/// Never fails: a missing or non-numeric request selects page 1, numbers
/// below 1 clamp to the first page and numbers past the end clamp to the
/// last. An empty sequence still has one (empty) page.
pub fn paginate<T>(items: Vec<T>, page_size: usize, requested: Option<&str>) -> Page<T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size).max(1);
    let number = resolve_page_number(requested, total_pages);

    let items: Vec<T> = items
        .into_iter()
        .skip((number - 1) * page_size)
        .take(page_size)
        .collect();

    let has_previous = number > 1;
    let has_next = number < total_pages;

    Page {
        items,
        number,
        total_pages,
        total_items,
        has_previous,
        has_next,
        previous_page_number: has_previous.then(|| number - 1),
        next_page_number: has_next.then(|| number + 1),
    }
}

fn resolve_page_number(requested: Option<&str>, total_pages: usize) -> usize {
    let Some(raw) = requested else {
        return 1;
    };
    let raw = raw.trim();
    match raw.parse::<i64>() {
        Ok(n) if n < 1 => 1,
        Ok(n) => usize::try_from(n).map_or(total_pages, |n| n.min(total_pages)),
        // Too large for i64 but still a positive integer: past the end.
        Err(_) if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) => total_pages,
        Err(_) => 1,
    }
}
