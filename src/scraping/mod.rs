pub mod browser_manager;
pub mod page_source;

pub use page_source::{BrowserSource, FileSource, HttpSource, PageSource};
