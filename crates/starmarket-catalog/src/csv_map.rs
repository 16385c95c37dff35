//! Decoding of the comma-separated fields used by the catalog tables.
//!
//! Tables encode maps as `PR_Ore:100, PR_Metal:2.5` and aligned lists as
//! `Mining,Industrial`. Decoding is lenient: malformed entries are dropped
//! and the rest of the field is kept.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use starmarket_types::ResourceId;

/// Nominal penalty, in percent.
const NOMINAL_PERCENT: Decimal = Decimal::ONE_HUNDRED;

/// Split a comma-separated field into trimmed, non-empty parts.
pub fn split_csv(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

/// Split a comma-separated list whose positions align with sibling lists.
///
/// Parts are trimmed but blank parts are kept, so position `i` in one list
/// still refers to position `i` in the others.
pub fn split_aligned(raw: &str) -> Vec<&str> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.split(',').map(str::trim).collect()
}

/// Parse a decimal, accepting plain and scientific notation.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// Parse an `id:amount` map.
///
/// Entries without a colon, with an empty id or value, or with an
/// unparseable amount are skipped. Later duplicates replace earlier ones.
pub fn parse_amount_map(raw: &str) -> BTreeMap<ResourceId, Decimal> {
    let mut map = BTreeMap::new();
    for entry in split_csv(raw) {
        let Some((id, value)) = entry.split_once(':') else {
            continue;
        };
        let id = id.trim();
        if id.is_empty() {
            continue;
        }
        if let Some(amount) = parse_decimal(value) {
            map.insert(ResourceId::from(id), amount);
        }
    }
    map
}

/// Parse a slot count. Unparseable counts are zero.
pub fn parse_count(raw: &str) -> i64 {
    raw.trim().parse().unwrap_or(0)
}

/// Parse a slot penalty such as `40%` into an absolute percentage (`140`).
///
/// A blank field is nominal. An unparseable or negative surcharge counts
/// as zero, so the result is never below 100.
pub fn parse_penalty_percent(raw: &str) -> Decimal {
    let trimmed = raw.trim();
    let surcharge = trimmed.strip_suffix('%').unwrap_or(trimmed);
    let surcharge = parse_decimal(surcharge)
        .unwrap_or(Decimal::ZERO)
        .max(Decimal::ZERO);
    NOMINAL_PERCENT
        .checked_add(surcharge)
        .unwrap_or(NOMINAL_PERCENT)
}
