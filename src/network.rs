//! Network URL constants and service-wide defaults.

use std::time::Duration;

/// Default REST API base URL.
pub const DEFAULT_API_URL: &str = "https://crypto-sphare-backend.onrender.com/api";

/// Interval between scheduled asset refreshes.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(120);

/// Quiet window before a typed search term is applied.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Maximum number of conversion history entries kept.
pub const HISTORY_CAPACITY: usize = 5;

/// Storage key holding the favorited asset ids.
pub const FAVORITES_KEY: &str = "cryptoFavorites";

/// Widest viewport (in px) still rendered with the narrow page size.
pub const NARROW_VIEWPORT_MAX_WIDTH: u32 = 768;
