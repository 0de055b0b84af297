//! Fallback chain resolution.

use crate::locale::LocaleId;

/// Canonical regional variant for a bare language code.
///
/// Consulted when a lookup for `es-MX` has to fall back past `es`: the next
/// candidate is the variant most translation sets ship (`es-ES`).
const REGIONAL_VARIANTS: &[(&str, &str)] = &[
    ("de", "DE"),
    ("en", "US"),
    ("es", "ES"),
    ("fr", "FR"),
    ("it", "IT"),
    ("ja", "JP"),
    ("ko", "KR"),
    ("nl", "NL"),
    ("pt", "PT"),
    ("ru", "RU"),
    ("zh", "CN"),
];

/// The canonical regional variant for `language`, if the built-in table has one.
///
/// ```
/// use localengine_core::fallback::canonical_variant;
///
/// assert_eq!(canonical_variant("es").unwrap().as_str(), "es-ES");
/// assert!(canonical_variant("eo").is_none());
/// ```
pub fn canonical_variant(language: &str) -> Option<LocaleId> {
    let language = language.to_ascii_lowercase();
    REGIONAL_VARIANTS
        .binary_search_by(|(lang, _)| (*lang).cmp(language.as_str()))
        .ok()
        .and_then(|idx| {
            let (lang, region) = REGIONAL_VARIANTS[idx];
            LocaleId::new(lang, Some(region)).ok()
        })
}

/// Ordered, duplicate-free list of locales to try for a lookup.
///
/// Order: `requested`, its language-only form, the canonical regional
/// variant of that language, then `default`. A candidate already present
/// earlier is skipped, so the first occurrence wins. The result always
/// contains `default`, and it is the last entry unless an earlier step
/// already produced it.
///
/// ```
/// use localengine_core::{LocaleId, fallback::resolve_chain};
///
/// let requested = LocaleId::parse("es-MX").unwrap();
/// let default = LocaleId::parse("en-US").unwrap();
/// let chain: Vec<String> = resolve_chain(&requested, &default)
///     .iter()
///     .map(ToString::to_string)
///     .collect();
/// assert_eq!(chain, ["es-MX", "es", "es-ES", "en-US"]);
/// ```
pub fn resolve_chain(requested: &LocaleId, default: &LocaleId) -> Vec<LocaleId> {
    let mut chain = Vec::with_capacity(4);
    let mut push = |candidate: LocaleId| {
        if !chain.contains(&candidate) {
            chain.push(candidate);
        }
    };

    push(requested.clone());
    push(requested.language_only());
    if let Some(variant) = canonical_variant(requested.language()) {
        push(variant);
    }
    push(default.clone());

    chain
}
