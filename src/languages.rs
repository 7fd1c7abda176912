//! Supported translation languages and their speech locales
//!
//! The registry is a fixed, ordered table. English is always first and
//! doubles as the fallback for unknown codes, so lookups never fail.

/// Locale used when a language has no explicit speech locale
pub const DEFAULT_SPEECH_LOCALE: &str = "en-US";

/// A language the translation provider understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// Provider language code (e.g. "ES")
    pub code: &'static str,

    /// Human-readable name
    pub name: &'static str,

    /// Locale tag for speech recognition and synthesis (e.g. "es-ES")
    pub speech_locale: Option<&'static str>,
}

impl Language {
    /// Speech locale, defaulting to `en-US`
    #[must_use]
    pub fn speech_locale(&self) -> &'static str {
        self.speech_locale.unwrap_or(DEFAULT_SPEECH_LOCALE)
    }
}

/// All supported languages, English first
pub const LANGUAGES: &[Language] = &[
    Language {
        code: "EN",
        name: "English",
        speech_locale: Some("en-US"),
    },
    Language {
        code: "ES",
        name: "Spanish",
        speech_locale: Some("es-ES"),
    },
    Language {
        code: "FR",
        name: "French",
        speech_locale: Some("fr-FR"),
    },
    Language {
        code: "DE",
        name: "German",
        speech_locale: Some("de-DE"),
    },
    Language {
        code: "IT",
        name: "Italian",
        speech_locale: Some("it-IT"),
    },
    Language {
        code: "JA",
        name: "Japanese",
        speech_locale: Some("ja-JP"),
    },
    Language {
        code: "ZH",
        name: "Chinese",
        speech_locale: Some("zh-CN"),
    },
    Language {
        code: "RU",
        name: "Russian",
        speech_locale: Some("ru-RU"),
    },
    Language {
        code: "PT",
        name: "Portuguese",
        speech_locale: Some("pt-PT"),
    },
    Language {
        code: "AR",
        name: "Arabic",
        speech_locale: Some("ar-SA"),
    },
];

/// Find a language by code, falling back to the first registered language
#[must_use]
pub fn lookup(code: &str) -> &'static Language {
    find(code).unwrap_or(&LANGUAGES[0])
}

/// Speech locale for a language code
#[must_use]
pub fn speech_locale(code: &str) -> &'static str {
    lookup(code).speech_locale()
}

/// Whether the code names a registered language
#[must_use]
pub fn is_supported(code: &str) -> bool {
    find(code).is_some()
}

fn find(code: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|lang| lang.code == code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_language_has_code_name_and_locale() {
        for lang in LANGUAGES {
            assert!(!lang.code.is_empty());
            assert!(!lang.name.is_empty());
            assert!(!speech_locale(lookup(lang.code).code).is_empty());
        }
    }

    #[test]
    fn unknown_code_falls_back_to_english() {
        let lang = lookup("unknown-code");
        assert_eq!(lang.code, "EN");
        assert_eq!(lang.name, "English");
        assert_eq!(speech_locale("unknown-code"), "en-US");
    }

    #[test]
    fn known_codes_resolve_their_locale() {
        assert_eq!(speech_locale("ES"), "es-ES");
        assert_eq!(speech_locale("ZH"), "zh-CN");
        assert_eq!(lookup("JA").name, "Japanese");
    }

    #[test]
    fn missing_locale_defaults_to_english() {
        let lang = Language {
            code: "XX",
            name: "Test",
            speech_locale: None,
        };
        assert_eq!(lang.speech_locale(), DEFAULT_SPEECH_LOCALE);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert!(is_supported("FR"));
        assert!(!is_supported("fr"));
    }
}
