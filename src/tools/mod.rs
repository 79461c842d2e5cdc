pub mod export;
pub mod scrape;
