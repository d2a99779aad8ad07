use tracing::warn;

use crate::config::PositionBucket;
use crate::errors::Result;

/// derive the customer identifier
///
/// Pure function of loan type code, term length, two-digit year, the
/// requester's initials, and the position bucket letter: the same inputs
/// always yield the same id. Uniqueness is the caller's concern, resolved
/// through [`resolve_unique`].
pub fn derive_customer_id(
    loan_type_code: char,
    term_months: u32,
    year: i32,
    first_initial: char,
    last_initial: char,
    position: u32,
) -> Result<String> {
    let bucket = PositionBucket::for_position(position)?;
    let yy = year.rem_euclid(100);

    Ok(format!(
        "{}{}{:02}{}{}{}",
        loan_type_code,
        term_months,
        yy,
        first_initial.to_ascii_uppercase(),
        last_initial.to_ascii_uppercase(),
        bucket.category,
    ))
}

/// resolve a generated id against already-assigned ones
///
/// Two accounts can legitimately produce the same base id (same tier, year,
/// initials, bucket). A colliding id gets a numeric suffix appended until it
/// is unique; the collision is reported, never silently accepted.
pub fn resolve_unique(
    base: String,
    taken: impl Fn(&str) -> Result<bool>,
) -> Result<(String, bool)> {
    if !taken(&base)? {
        return Ok((base, false));
    }

    let mut suffix = 2u32;
    loop {
        let candidate = format!("{}-{}", base, suffix);
        if !taken(&candidate)? {
            warn!(base = %base, assigned = %candidate, "customer id collision resolved");
            return Ok((candidate, true));
        }
        suffix += 1;
    }
}
