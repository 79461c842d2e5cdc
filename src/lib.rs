pub mod core;
pub mod extract;
pub mod scraping;
pub mod tools;

// --- Primary core exports ---
pub use core::types;
pub use core::types::*;
pub use core::ScoutConfig;
pub use extract::FacilityExtractor;
