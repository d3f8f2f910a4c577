//! Text processing for extracted page content
//!
//! Two pure functions make up this module:
//! - [`clean_text`] normalizes raw text pulled out of a page
//! - [`extract_keywords`] ranks the meaningful words of cleaned text
//!
//! Both are deterministic and free of shared state.

mod clean;
mod keywords;

pub use clean::clean_text;
pub use keywords::{extract_keywords, KeywordOptions, STOP_WORDS};
