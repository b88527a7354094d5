use regex::Regex;

use crate::utils::error::{PayError, Result};

/// Normalize a raw expiration string into `(month, year)`.
///
/// Separators (`/` and whitespace) are stripped, then the remainder is split
/// by length: 3 digits is a single-digit month plus a 2-digit year, 4 digits
/// is a 2-digit month plus a 2-digit year. Anything else is rejected with the
/// offending input. No numeric range checking happens here; the portal form
/// is the authority on what a valid month is.
pub fn parse_expiration(raw: &str) -> Result<(String, String)> {
    let separators = Regex::new(r"[/\s]+").unwrap();
    let cleaned = separators.replace_all(raw, "");

    let mut rest = cleaned.chars();
    match cleaned.chars().count() {
        3 => Ok((rest.by_ref().take(1).collect(), rest.collect())),
        4 => Ok((rest.by_ref().take(2).collect(), rest.collect())),
        _ => Err(PayError::InvalidExpiration(raw.to_string())),
    }
}
