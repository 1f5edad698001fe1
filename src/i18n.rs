// i18n.rs
//
// Runtime UI strings:
// - English strings are compiled in from assets/i18n.json and always serve as fallback
// - Other languages come from assets/i18n/<lang>.json or the "<lang>" table of assets/i18n.json
// - Lookup: tr("key") / tr_with("key", &[("name", ...)]) with {name} placeholders
//
// Language selection:
// - CLI: --lang <code>
// - Env: WALKTHROUGH_LANG
// - Default: en

use crate::config::find_asset;
use once_cell::sync::{Lazy, OnceCell};
use serde::Deserialize;
use std::{collections::HashMap, path::Path, sync::RwLock};

const DEFAULT_LANG: &str = "en";

static BUNDLED: &str = include_str!("../assets/i18n.json");

#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct Catalog(HashMap<String, HashMap<String, String>>);

static BUNDLED_CATALOG: Lazy<Catalog> = Lazy::new(|| {
    serde_json::from_str(BUNDLED).unwrap_or_else(|e| {
        log::error!("Bundled i18n table is invalid: {e}");
        Catalog(HashMap::new())
    })
});

#[derive(Debug, Clone)]
pub struct I18n {
    pub lang: String,
    map: HashMap<String, String>,
}

static I18N: OnceCell<RwLock<I18n>> = OnceCell::new();

fn read_table(path: &Path) -> Option<HashMap<String, String>> {
    let text = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&text).ok()
}

fn read_catalog_table(path: &Path, lang: &str) -> Option<HashMap<String, String>> {
    let text = std::fs::read_to_string(path).ok()?;
    let Catalog(mut all) = serde_json::from_str(&text).ok()?;
    all.remove(lang)
}

fn load_lang(lang: &str) -> HashMap<String, String> {
    if let Some(p) = find_asset(&format!("i18n/{lang}.json")) {
        if let Some(m) = read_table(&p) {
            return m;
        }
    }

    if let Some(p) = find_asset("i18n.json") {
        if let Some(m) = read_catalog_table(&p, lang) {
            return m;
        }
    }

    BUNDLED_CATALOG.0.get(lang).cloned().unwrap_or_default()
}

/// Switches the active language. Safe to call again at runtime.
pub fn init(lang: impl Into<String>) {
    let lang = lang.into();
    let map = load_lang(&lang);
    if map.is_empty() && lang != DEFAULT_LANG {
        log::warn!("No strings for language '{lang}', falling back to {DEFAULT_LANG}");
    }

    let i = I18n { lang, map };
    if let Some(lock) = I18N.get() {
        if let Ok(mut w) = lock.write() {
            *w = i;
        }
    } else {
        let _ = I18N.set(RwLock::new(i));
    }
}

pub fn current_lang() -> String {
    I18N.get()
        .and_then(|l| l.read().ok().map(|i| i.lang.clone()))
        .unwrap_or_else(|| DEFAULT_LANG.to_string())
}

/// Localized text for `key`: active language, then bundled English, then the key itself.
pub fn tr(key: &str) -> String {
    if let Some(v) = I18N
        .get()
        .and_then(|l| l.read().ok())
        .and_then(|i| i.map.get(key).cloned())
    {
        return v;
    }
    BUNDLED_CATALOG
        .0
        .get(DEFAULT_LANG)
        .and_then(|m| m.get(key).cloned())
        .unwrap_or_else(|| key.to_string())
}

/// `tr` plus `{name}` substitution. Unknown placeholders are left as-is.
pub fn tr_with(key: &str, args: &[(&str, String)]) -> String {
    let mut s = tr(key);
    for (k, v) in args {
        s = s.replace(&format!("{{{k}}}"), v);
    }
    s
}

pub fn resolve_lang_from_args() -> String {
    let mut it = std::env::args();
    while let Some(a) = it.next() {
        if a == "--lang" {
            if let Some(v) = it.next() {
                return v;
            }
        }
    }

    if let Ok(v) = std::env::var("WALKTHROUGH_LANG") {
        if !v.trim().is_empty() {
            return v;
        }
    }

    DEFAULT_LANG.to_string()
}
