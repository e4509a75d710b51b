use regex::Regex;

use std::sync::LazyLock;

static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\-.,]+").expect("separator pattern is valid"));

/// Legal-entity and trade suffixes removed from the end of a name key, checked
/// in this order.
pub const SUFFIXES: [&str; 16] = [
    "llc",
    "inc",
    "incorporated",
    "corp",
    "corporation",
    "company",
    "co",
    "dba",
    "limited",
    "ltd",
    "pllc",
    "plc",
    "group",
    "holdings",
    "farms",
    "farm",
];

/// Returns the matching key for a vendor or brand name.
///
/// The key is lowercase, has all whitespace, hyphens, periods and commas
/// removed, and has common company suffixes (see [`SUFFIXES`]) and a trailing
/// `s` stripped, so that `"Green Leaf Farms, LLC"` and `"Green Leaf Farm"`
/// share the key `"greenleaf"`.
///
/// Stripping repeats until the key stops changing, so normalizing a key again
/// always gives the same key.
///
/// Blank input gives the empty key, which is never used for matching.
///
/// # Examples
///
/// ```
/// # use brand_ppi::normalize_name;
/// assert_eq!(normalize_name("Acme Farm LLC"), "acme");
/// assert_eq!(normalize_name("  Hudson-Valley Co. "), "hudsonvalley");
/// assert_eq!(normalize_name(""), "");
/// ```
#[must_use]
pub fn normalize_name(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let mut key = SEPARATORS.replace_all(&lowered, "").into_owned();
    loop {
        let before = key.len();
        strip_suffixes(&mut key);
        if before == key.len() {
            return key;
        }
    }
}

fn strip_suffixes(key: &mut String) {
    for suffix in SUFFIXES {
        if key.ends_with(suffix) {
            key.truncate(key.len() - suffix.len());
        }
    }
    if key.ends_with('s') {
        key.pop();
    }
}
