//! Per-field selector lists and detail-page sentinel literals, read-only
//! and shared across worker tasks (read-only constants; safe to
//! share").

pub const RESULT_LINK_SELECTORS: &[&str] = &[
    "a.hfpxzc",
    "a[href*='/maps/place/']",
    "div[role='feed'] a",
];

pub const TITLE_SELECTORS: &[&str] = &["h1.DUwDvf", "h1[class*='fontHeadlineLarge']", "h1"];

pub const ADDRESS_SELECTORS: &[&str] =
    &["button[data-item-id='address']", "button[aria-label*='Address']"];

pub const PHONE_SELECTORS: &[&str] =
    &["button[data-item-id^='phone']", "button[aria-label*='Phone']"];

pub const RATING_SELECTORS: &[&str] = &["div.F7nice span[aria-hidden='true']", "span.ceNzKf"];

pub const REVIEWS_SELECTORS: &[&str] = &["div.F7nice span[aria-label*='review']"];

pub const WEBSITE_SELECTORS: &[&str] =
    &["a[data-item-id='authority']", "a[aria-label*='Website']"];

pub const CATEGORY_SELECTORS: &[&str] = &["button.DkEaL", "button[jsaction*='category']"];

pub const HOURS_TOGGLE_SELECTORS: &[&str] = &[
    "div[aria-label*='Show open hours']",
    "div[aria-label*='Stunden anzeigen']",
    "div[aria-label*='afficher les horaires']",
    "div[aria-label*='mostra orari']",
    "div[aria-label*='mostrar horario']",
];

pub const HOURS_ROW_SELECTOR: &str = "table.eK4R0e tr";

pub const SHARE_BUTTON_SELECTORS: &[&str] = &["button[data-value='Share']", "button[aria-label='Share']"];

pub const SOCIAL_DOMAIN_STEMS: &[&str] = &[
    "facebook.com",
    "instagram.com",
    "twitter.com",
    "linkedin.com",
    "youtube.com",
];

/// Words that mark a heading as a search-results page rather than a detail
/// page, across the supported interface languages.
pub const RESULTS_PAGE_SENTINELS: &[&str] =
    &["results", "ergebnisse", "resultados", "résultats", "risultati"];
