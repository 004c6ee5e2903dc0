//! View domain — derived, filtered, sorted and paginated views of the assets.
//!
//! [`ViewParameters`] holds the user-controlled inputs, [`derive_view`] turns a
//! collection plus parameters plus favorites into a [`PageView`], and
//! [`Debouncer`] settles search input before it reaches the parameters.

pub mod debounce;
pub mod derive;

use crate::domain::asset::Asset;
use crate::network::NARROW_VIEWPORT_MAX_WIDTH;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use debounce::Debouncer;
pub use derive::{derive_view, filter_favorites, filter_search, paginate, sort_assets, ViewDerivation};

// ─── Sorting ─────────────────────────────────────────────────────────────────

/// Field a view is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    MarketCap,
    Price,
    PercentChange24h,
    PercentChange7d,
    Volume24h,
    CirculatingSupply,
    Name,
    Symbol,
}

impl SortKey {
    pub const ALL: [SortKey; 8] = [
        SortKey::MarketCap,
        SortKey::Price,
        SortKey::PercentChange24h,
        SortKey::PercentChange7d,
        SortKey::Volume24h,
        SortKey::CirculatingSupply,
        SortKey::Name,
        SortKey::Symbol,
    ];
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SortKey::MarketCap => "marketCap",
            SortKey::Price => "price",
            SortKey::PercentChange24h => "percentChange24h",
            SortKey::PercentChange7d => "percentChange7d",
            SortKey::Volume24h => "volume24h",
            SortKey::CirculatingSupply => "circulatingSupply",
            SortKey::Name => "name",
            SortKey::Symbol => "symbol",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

// ─── Viewport ────────────────────────────────────────────────────────────────

/// Coarse viewport width class; decides the page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ViewportClass {
    Narrow,
    #[default]
    Wide,
}

impl ViewportClass {
    pub fn from_width(px: u32) -> Self {
        if px <= NARROW_VIEWPORT_MAX_WIDTH {
            ViewportClass::Narrow
        } else {
            ViewportClass::Wide
        }
    }

    pub fn page_size(self) -> usize {
        match self {
            ViewportClass::Narrow => 6,
            ViewportClass::Wide => 8,
        }
    }
}

// ─── ViewParameters ──────────────────────────────────────────────────────────

/// User-controlled derivation inputs.
///
/// Setters that can shrink the result set (search term, favorites-only) reset
/// `page` to 1. Sorting never does.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewParameters {
    pub search_term: String,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
    pub favorites_only: bool,
}

impl Default for ViewParameters {
    fn default() -> Self {
        Self::for_viewport(ViewportClass::default())
    }
}

impl ViewParameters {
    pub fn for_viewport(viewport: ViewportClass) -> Self {
        Self {
            search_term: String::new(),
            sort_key: SortKey::default(),
            sort_direction: SortDirection::default(),
            page: 1,
            page_size: viewport.page_size(),
            favorites_only: false,
        }
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.page = 1;
    }

    pub fn set_favorites_only(&mut self, on: bool) {
        self.favorites_only = on;
        self.page = 1;
    }

    pub fn set_sort(&mut self, key: SortKey, direction: SortDirection) {
        self.sort_key = key;
        self.sort_direction = direction;
    }

    /// Header-click semantics: the active key while ascending flips to
    /// descending, anything else selects `key` ascending.
    pub fn request_sort(&mut self, key: SortKey) {
        if self.sort_key == key && self.sort_direction == SortDirection::Asc {
            self.sort_direction = SortDirection::Desc;
        } else {
            self.sort_key = key;
            self.sort_direction = SortDirection::Asc;
        }
    }

    /// Set the page as given; out-of-range pages are not corrected.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn set_viewport(&mut self, viewport: ViewportClass) {
        let size = viewport.page_size();
        if size != self.page_size {
            self.page_size = size;
            self.page = 1;
        }
    }

    pub fn next_page(&mut self, total_pages: usize) {
        self.page = (self.page + 1).min(total_pages.max(1));
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }
}

// ─── PageView ────────────────────────────────────────────────────────────────

/// One entry of the compact page navigator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    Page(usize),
    Gap,
}

/// The displayed page plus pagination metadata.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageView {
    pub items: Vec<Asset>,
    pub total_count: usize,
    /// 0 iff `total_count` is 0.
    pub total_pages: usize,
    pub page: usize,
    pub page_size: usize,
}

impl PageView {
    pub fn current_page_items(&self) -> &[Asset] {
        &self.items
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// First page, the window `page-1..=page+1`, last page, with gaps where
    /// the window is detached from either end.
    pub fn page_links(&self) -> Vec<PageLink> {
        let total = self.total_pages;
        if total == 0 {
            return Vec::new();
        }
        let page = self.page.clamp(1, total);
        let start = page.saturating_sub(1).max(1);
        let end = (page + 1).min(total);

        let mut links = Vec::with_capacity(end - start + 5);
        if start > 1 {
            links.push(PageLink::Page(1));
        }
        if start > 2 {
            links.push(PageLink::Gap);
        }
        links.extend((start..=end).map(PageLink::Page));
        if end + 1 < total {
            links.push(PageLink::Gap);
        }
        if end < total {
            links.push(PageLink::Page(total));
        }
        links
    }
}
