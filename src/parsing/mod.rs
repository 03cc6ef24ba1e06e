//! HTML parsing: listing discovery on search pages and per-field extraction
//! on listing pages.

pub mod listing;
pub mod search_page;
