//! Pure derivation pipeline: favorites → search → sort → paginate.

use super::{PageView, SortDirection, SortKey, ViewParameters};
use crate::domain::asset::Asset;
use crate::domain::favorites::FavoriteSet;
use std::cmp::Ordering;

pub fn filter_favorites<'a>(
    assets: impl IntoIterator<Item = &'a Asset>,
    favorites: &FavoriteSet,
) -> Vec<&'a Asset> {
    assets
        .into_iter()
        .filter(|a| favorites.contains(&a.id))
        .collect()
}

/// Case-insensitive substring match on name or symbol. Only the empty term
/// matches all; whitespace is part of the needle.
pub fn filter_search<'a>(assets: Vec<&'a Asset>, term: &str) -> Vec<&'a Asset> {
    if term.is_empty() {
        return assets;
    }
    let needle = term.to_lowercase();
    assets
        .into_iter()
        .filter(|a| {
            a.name.to_lowercase().contains(&needle)
                || a.symbol.as_str().to_lowercase().contains(&needle)
        })
        .collect()
}

fn compare(a: &Asset, b: &Asset, key: SortKey) -> Ordering {
    match key {
        SortKey::MarketCap => a.market_cap.cmp(&b.market_cap),
        SortKey::Price => a.price.cmp(&b.price),
        SortKey::PercentChange24h => a.percent_change_24h.cmp(&b.percent_change_24h),
        SortKey::PercentChange7d => a.percent_change_7d.cmp(&b.percent_change_7d),
        SortKey::Volume24h => a.volume_24h.cmp(&b.volume_24h),
        SortKey::CirculatingSupply => a.circulating_supply.cmp(&b.circulating_supply),
        SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortKey::Symbol => a
            .symbol
            .as_str()
            .to_lowercase()
            .cmp(&b.symbol.as_str().to_lowercase()),
    }
}

/// Stable sort; equal keys keep their incoming order in both directions.
pub fn sort_assets(assets: &mut [&Asset], key: SortKey, direction: SortDirection) {
    match direction {
        SortDirection::Asc => assets.sort_by(|a, b| compare(a, b, key)),
        SortDirection::Desc => assets.sort_by(|a, b| compare(b, a, key)),
    }
}

/// Slice out `page` (1-based). Pages past the end are empty.
pub fn paginate(sorted: &[&Asset], page: usize, page_size: usize) -> PageView {
    let total_count = sorted.len();
    let page_size = page_size.max(1);
    let total_pages = total_count.div_ceil(page_size);
    let page = page.max(1);

    let start = (page - 1).saturating_mul(page_size);
    let items = sorted
        .iter()
        .skip(start)
        .take(page_size)
        .map(|a| (*a).clone())
        .collect();

    PageView {
        items,
        total_count,
        total_pages,
        page,
        page_size,
    }
}

/// Run the full pipeline.
pub fn derive_view(assets: &[Asset], params: &ViewParameters, favorites: &FavoriteSet) -> PageView {
    let filtered = if params.favorites_only {
        filter_favorites(assets, favorites)
    } else {
        assets.iter().collect()
    };
    let mut filtered = filter_search(filtered, &params.search_term);
    sort_assets(&mut filtered, params.sort_key, params.sort_direction);
    paginate(&filtered, params.page, params.page_size)
}

// ─── Memo ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
struct MemoKey {
    assets_revision: u64,
    params: ViewParameters,
    favorites_revision: Option<u64>,
}

/// Memoizes the last derived page for the inputs that produced it.
///
/// Inputs are identified by revision counters; the favorites revision only
/// participates while `favorites_only` is set.
#[derive(Debug, Default)]
pub struct ViewDerivation {
    last: Option<(MemoKey, PageView)>,
    computations: u64,
}

impl ViewDerivation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(
        &mut self,
        assets: &[Asset],
        assets_revision: u64,
        params: &ViewParameters,
        favorites: &FavoriteSet,
        favorites_revision: u64,
    ) -> &PageView {
        let key = MemoKey {
            assets_revision,
            params: params.clone(),
            favorites_revision: params.favorites_only.then_some(favorites_revision),
        };

        if self.last.as_ref().map_or(true, |(k, _)| *k != key) {
            self.computations += 1;
            self.last = None;
        }
        &self
            .last
            .get_or_insert_with(|| (key, derive_view(assets, params, favorites)))
            .1
    }

    /// Number of times the pipeline actually ran.
    pub fn computations(&self) -> u64 {
        self.computations
    }

    pub fn invalidate(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::AssetId;
    use rust_decimal::Decimal;

    fn asset(id: i64, name: &str, symbol: &str, market_cap: i64, price: i64) -> Asset {
        Asset {
            id: AssetId::Num(id),
            name: name.to_string(),
            symbol: symbol.into(),
            price: Decimal::from(price),
            percent_change_24h: Decimal::from(id % 3) - Decimal::ONE,
            percent_change_7d: Decimal::ZERO,
            market_cap: Decimal::from(market_cap),
            volume_24h: Decimal::ZERO,
            circulating_supply: Decimal::ZERO,
        }
    }

    fn universe() -> Vec<Asset> {
        vec![
            asset(1, "Bitcoin", "BTC", 900, 60000),
            asset(2, "Ethereum", "ETH", 400, 3000),
            asset(3, "Tether", "USDT", 100, 1),
            asset(4, "BNB", "BNB", 80, 500),
            asset(5, "Solana", "SOL", 70, 150),
            asset(6, "USD Coin", "USDC", 30, 1),
            asset(7, "XRP", "XRP", 25, 1),
            asset(8, "Dogecoin", "DOGE", 20, 1),
            asset(9, "Cardano", "ADA", 15, 1),
            asset(10, "Wrapped Bitcoin", "WBTC", 10, 60000),
        ]
    }

    fn symbols(items: &[Asset]) -> Vec<&str> {
        items.iter().map(|a| a.symbol.as_str()).collect()
    }

    #[test]
    fn test_search_is_case_insensitive_on_name_or_symbol() {
        let assets = universe();
        let hits = filter_search(assets.iter().collect(), "bItCo");
        let hits: Vec<_> = hits.iter().map(|a| a.symbol.as_str()).collect();
        assert_eq!(hits, ["BTC", "WBTC"]);

        let hits = filter_search(assets.iter().collect(), "usd");
        assert_eq!(hits.len(), 2);
        assert_eq!(filter_search(assets.iter().collect(), "").len(), assets.len());
    }

    #[test]
    fn test_search_keeps_whitespace_in_term() {
        let assets = vec![
            asset(1, "Bitcoin", "BTC", 900, 60000),
            asset(2, "Bitcoin Cash", "BCH", 10, 400),
        ];
        let hits = |term: &str| -> Vec<String> {
            filter_search(assets.iter().collect(), term)
                .iter()
                .map(|a| a.symbol.to_string())
                .collect()
        };
        assert!(hits(" btc").is_empty());
        assert_eq!(hits("bitcoin "), ["BCH"]);
        assert!(hits("   ").is_empty());
        assert_eq!(hits("").len(), 2);
    }

    #[test]
    fn test_memo_returns_cached_page() {
        let assets = universe();
        let params = ViewParameters::default();
        let mut memo = ViewDerivation::new();
        let first = memo.view(&assets, 1, &params, &FavoriteSet::new(), 0).clone();
        let second = memo.view(&assets, 1, &params, &FavoriteSet::new(), 0).clone();
        assert_eq!(first, second);
        assert_eq!(first.items[0].symbol, "BTC");
        assert_eq!(memo.computations(), 1);
    }

    #[test]
    fn test_view_is_subset_of_collection() {
        let assets = universe();
        let mut favorites = FavoriteSet::new();
        favorites.insert(AssetId::Num(2));
        favorites.insert(AssetId::Num(9));
        favorites.insert(AssetId::Num(404));

        let mut params = ViewParameters::default();
        params.set_favorites_only(true);
        let page = derive_view(&assets, &params, &favorites);
        assert_eq!(page.total_count, 2);
        for item in page.current_page_items() {
            assert!(assets.contains(item));
            assert!(favorites.contains(&item.id));
        }
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let assets = universe();
        let mut refs: Vec<&Asset> = assets.iter().collect();
        sort_assets(&mut refs, SortKey::Price, SortDirection::Asc);
        let ones: Vec<_> = refs
            .iter()
            .filter(|a| a.price == Decimal::ONE)
            .map(|a| a.symbol.as_str())
            .collect();
        assert_eq!(ones, ["USDT", "USDC", "XRP", "DOGE", "ADA"]);

        sort_assets(&mut refs, SortKey::Price, SortDirection::Desc);
        let btc: Vec<_> = refs.iter().take(2).map(|a| a.symbol.as_str()).collect();
        assert_eq!(btc, ["BTC", "WBTC"]);
    }

    #[test]
    fn test_flipped_direction_reverses_strict_order() {
        let assets = universe();
        let mut asc: Vec<&Asset> = assets.iter().collect();
        sort_assets(&mut asc, SortKey::MarketCap, SortDirection::Asc);
        let mut desc = asc.clone();
        sort_assets(&mut desc, SortKey::MarketCap, SortDirection::Desc);
        desc.reverse();
        assert_eq!(asc, desc);
    }

    #[test]
    fn test_pages_cover_without_overlap() {
        let assets = universe();
        let mut params = ViewParameters::default();
        params.page_size = 3;
        let first = derive_view(&assets, &params, &FavoriteSet::new());
        assert_eq!(first.total_pages, 4);

        let mut seen = Vec::new();
        for page in 1..=first.total_pages {
            params.set_page(page);
            seen.extend(derive_view(&assets, &params, &FavoriteSet::new()).items);
        }
        let mut sorted: Vec<&Asset> = assets.iter().collect();
        sort_assets(&mut sorted, SortKey::MarketCap, SortDirection::Desc);
        let sorted: Vec<Asset> = sorted.into_iter().cloned().collect();
        assert_eq!(seen, sorted);
    }

    #[test]
    fn test_empty_result_has_zero_pages() {
        let mut params = ViewParameters::default();
        params.set_search_term("nothing matches this");
        let page = derive_view(&universe(), &params, &FavoriteSet::new());
        assert_eq!(page.total_count(), 0);
        assert_eq!(page.total_pages(), 0);
        assert!(page.current_page_items().is_empty());
        assert!(page.is_empty());
    }

    #[test]
    fn test_out_of_range_page_is_empty_not_corrected() {
        let mut params = ViewParameters::default();
        params.set_page(9);
        let page = derive_view(&universe(), &params, &FavoriteSet::new());
        assert_eq!(page.page, 9);
        assert_eq!(page.total_pages, 2);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_market_cap_desc_then_favorites_only() {
        let assets = vec![asset(1, "Bitcoin", "BTC", 900, 1), asset(2, "Ethereum", "ETH", 400, 1)];
        let mut favorites = FavoriteSet::new();
        let mut params = ViewParameters::default();
        assert_eq!(symbols(&derive_view(&assets, &params, &favorites).items), ["BTC", "ETH"]);

        favorites.insert(AssetId::Num(2));
        params.set_favorites_only(true);
        assert_eq!(symbols(&derive_view(&assets, &params, &favorites).items), ["ETH"]);
    }

    #[test]
    fn test_memo_recomputes_only_on_input_change() {
        let assets = universe();
        let favorites = FavoriteSet::new();
        let mut params = ViewParameters::default();
        let mut memo = ViewDerivation::new();

        memo.view(&assets, 1, &params, &favorites, 0);
        memo.view(&assets, 1, &params, &favorites, 0);
        assert_eq!(memo.computations(), 1);

        // Favorites revision is ignored unless filtering by favorites.
        memo.view(&assets, 1, &params, &favorites, 7);
        assert_eq!(memo.computations(), 1);

        params.request_sort(SortKey::Name);
        let page = memo.view(&assets, 1, &params, &favorites, 7);
        assert_eq!(page.items[0].symbol, "BTC");
        assert_eq!(memo.computations(), 2);

        memo.view(&assets, 2, &params, &favorites, 7);
        assert_eq!(memo.computations(), 3);
    }
}
