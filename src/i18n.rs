use actix_web::HttpRequest;
use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;
use std::sync::OnceLock;

const EN_JSON: &str = include_str!("../assets/translations/en.json");
const UR_JSON: &str = include_str!("../assets/translations/ur.json");
const ROMAN_JSON: &str = include_str!("../assets/translations/roman.json");

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    Ur,
    /// Urdu written in Latin script.
    Roman,
}

impl Locale {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "en" | "en-us" | "en-gb" => Some(Locale::En),
            "ur" | "ur-pk" => Some(Locale::Ur),
            "roman" | "ur-latn" => Some(Locale::Roman),
            _ => None,
        }
    }
}

pub fn detect_locale(req: &HttpRequest) -> Locale {
    if let Some(lang) = req.query_string().split('&').find_map(|kv| {
        let mut it = kv.splitn(2, '=');
        let k = it.next()?;
        let v = it.next()?;
        if k == "lang" { Some(v) } else { None }
    }) {
        return Locale::parse(lang).unwrap_or(Locale::En);
    }

    if let Some(h) = req.headers().get("Accept-Language").and_then(|v| v.to_str().ok()) {
        let first = h.split(',').next().unwrap_or("").split(';').next().unwrap_or("").trim();
        if let Some(locale) = Locale::parse(first) {
            return locale;
        }
        if first.to_ascii_lowercase().starts_with("ur") { return Locale::Ur; }
    }

    Locale::En
}

fn table(locale: Locale) -> &'static Value {
    static EN: OnceLock<Value> = OnceLock::new();
    static UR: OnceLock<Value> = OnceLock::new();
    static ROMAN: OnceLock<Value> = OnceLock::new();

    let (cell, raw) = match locale {
        Locale::En => (&EN, EN_JSON),
        Locale::Ur => (&UR, UR_JSON),
        Locale::Roman => (&ROMAN, ROMAN_JSON),
    };
    cell.get_or_init(|| {
        serde_json::from_str(raw).unwrap_or_else(|e| {
            tracing::error!(?locale, error = %e, "translation table is not valid JSON");
            Value::Null
        })
    })
}

fn lookup<'a>(root: &'a Value, key: &str) -> Option<&'a str> {
    key.split('.')
        .try_fold(root, |node, part| node.as_object()?.get(part))?
        .as_str()
}

/// Resolves a dotted key such as `guide.intro.1.title`. Missing entries fall
/// back to English, and then to the key itself.
pub fn translate(locale: Locale, key: &str) -> Cow<'static, str> {
    if let Some(text) = lookup(table(locale), key) {
        return Cow::Borrowed(text);
    }
    if locale != Locale::En {
        if let Some(text) = lookup(table(Locale::En), key) {
            return Cow::Borrowed(text);
        }
    }
    Cow::Owned(key.to_string())
}
