//! Per-chunk output scraping
//!
//! A pure first-match scan applied to each output chunk as it arrives, so
//! a long-running stage surfaces its signal without waiting for process
//! exit.

use regex::Regex;

/// Return the first match of `pattern` in `chunk`, if any
pub fn scrape(chunk: &str, pattern: &Regex) -> Option<String> {
    pattern.find(chunk).map(|m| m.as_str().to_string())
}
