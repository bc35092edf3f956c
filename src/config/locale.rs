// SPDX-License-Identifier: MPL-2.0
//! Initial subtitle language resolution.

use super::{Config, FALLBACK_SUBTITLE_LANGUAGE};
use crate::domain::media::{LanguageCode, MediaItem};
use unic_langid::LanguageIdentifier;

/// Picks the subtitle language a freshly selected item should start with.
///
/// Resolution order:
/// 1. Explicit request (CLI flag), if the item offers it
/// 2. `preferred_subtitle_language` from the config file, if offered
/// 3. OS locale, matched on the primary language subtag
/// 4. English, then the item's first subtitle language
pub fn resolve_subtitle_language(
    requested: Option<&str>,
    config: &Config,
    item: &MediaItem,
) -> Option<LanguageCode> {
    let offered = |raw: &str| {
        LanguageCode::new(raw)
            .ok()
            .filter(|code| item.supports_subtitle(code))
    };

    if let Some(code) = requested.and_then(offered) {
        return Some(code);
    }

    if let Some(code) = config.preferred_subtitle_language.as_deref().and_then(offered) {
        return Some(code);
    }

    if let Some(os_locale) = sys_locale::get_locale() {
        if let Some(code) = match_locale(&os_locale, item) {
            return Some(code);
        }
    }

    item.default_subtitle_language(LanguageCode::new(FALLBACK_SUBTITLE_LANGUAGE).ok().as_ref())
}

/// Matches a locale string like `ja-JP` against the item's subtitle languages.
fn match_locale(locale: &str, item: &MediaItem) -> Option<LanguageCode> {
    let locale: LanguageIdentifier = locale.parse().ok()?;
    let exact = item
        .subtitle_languages
        .iter()
        .find(|code| code.identifier().as_ref() == Some(&locale));
    exact
        .or_else(|| {
            item.subtitle_languages
                .iter()
                .find(|code| code.same_language(&locale))
        })
        .cloned()
}
