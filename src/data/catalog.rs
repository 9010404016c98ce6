//! Static region reference data: state codes and names, district names.

use std::collections::BTreeSet;

use crate::data::raw::RawSnapshot;

/// Every column code carried by the states feed, with a display name.
pub const STATES: [(&str, &str); 39] = [
    ("an", "Andaman and Nicobar Islands"),
    ("ap", "Andhra Pradesh"),
    ("ar", "Arunachal Pradesh"),
    ("as", "Assam"),
    ("br", "Bihar"),
    ("ch", "Chandigarh"),
    ("ct", "Chhattisgarh"),
    ("dd", "Daman and Diu"),
    ("dl", "Delhi"),
    ("dn", "Dadra and Nagar Haveli"),
    ("ga", "Goa"),
    ("gj", "Gujarat"),
    ("hp", "Himachal Pradesh"),
    ("hr", "Haryana"),
    ("jh", "Jharkhand"),
    ("jk", "Jammu and Kashmir"),
    ("ka", "Karnataka"),
    ("kl", "Kerala"),
    ("la", "Ladakh"),
    ("ld", "Lakshadweep"),
    ("mh", "Maharashtra"),
    ("ml", "Meghalaya"),
    ("mn", "Manipur"),
    ("mp", "Madhya Pradesh"),
    ("mz", "Mizoram"),
    ("nl", "Nagaland"),
    ("or", "Odisha"),
    ("pb", "Punjab"),
    ("py", "Puducherry"),
    ("rj", "Rajasthan"),
    ("sk", "Sikkim"),
    ("tg", "Telangana"),
    ("tn", "Tamil Nadu"),
    ("tr", "Tripura"),
    ("tt", "Total"),
    ("un", "State Unassigned"),
    ("up", "Uttar Pradesh"),
    ("ut", "Uttarakhand"),
    ("wb", "West Bengal"),
];

/// Codes that are aggregates rather than a state/UT.
const NON_SELECTABLE: [&str; 2] = ["tt", "un"];

/// District names in the feed that are buckets, not districts.
const NON_DISTRICTS: [&str; 2] = ["Unknown", "Others"];

/// Display name for a state code (case-insensitive).
pub fn state_name(code: &str) -> Option<&'static str> {
    STATES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
}

/// State code for a display name (case-insensitive).
pub fn state_code(name: &str) -> Option<&'static str> {
    let name = name.trim();
    STATES
        .iter()
        .find(|(_, n)| n.eq_ignore_ascii_case(name))
        .map(|(code, _)| *code)
}

/// Resolve user input that is either a code (`mh`) or a name (`Maharashtra`).
pub fn resolve_state(input: &str) -> Option<&'static str> {
    let input = input.trim();
    STATES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(input))
        .map(|(code, _)| *code)
        .or_else(|| state_code(input))
}

/// States/UTs offered for selection (aggregates excluded).
pub fn selectable_states() -> impl Iterator<Item = (&'static str, &'static str)> {
    STATES
        .iter()
        .copied()
        .filter(|(code, _)| !NON_SELECTABLE.contains(code))
}

/// Unique `(district, state)` pairs in a snapshot, sorted, with bucket names removed.
///
/// Several district names exist in more than one state, so the pair is the key.
pub fn district_entries(snapshot: &RawSnapshot) -> Vec<(String, String)> {
    let entries: BTreeSet<(&str, &str)> = snapshot
        .districts
        .iter()
        .map(|row| (row.district.trim(), row.state.trim()))
        .filter(|(name, _)| !name.is_empty() && !NON_DISTRICTS.contains(name))
        .collect();
    entries
        .into_iter()
        .map(|(name, state)| (name.to_string(), state.to_string()))
        .collect()
}
