pub mod caching;
pub mod fallback;
pub mod google_news;
pub mod util;
pub mod yahoo_finance;
