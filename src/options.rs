//! Translation Configuration
//!
//! The processing options the user picks before submitting a page: which
//! translation provider the service should use and which font it should
//! typeset the translated text with. Both sets are closed enums on the
//! client side; adding a provider or font means adding a variant here.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Translation provider the remote service routes the text through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationMethod {
    #[default]
    Google,
    Hf,
    Baidu,
    Bing,
}

impl TranslationMethod {
    pub const ALL: [TranslationMethod; 4] = [
        TranslationMethod::Google,
        TranslationMethod::Hf,
        TranslationMethod::Baidu,
        TranslationMethod::Bing,
    ];

    /// Wire value sent in the `translation_method` form field
    pub fn as_str(&self) -> &'static str {
        match self {
            TranslationMethod::Google => "google",
            TranslationMethod::Hf => "hf",
            TranslationMethod::Baidu => "baidu",
            TranslationMethod::Bing => "bing",
        }
    }

    /// Human readable label for option pickers
    pub fn label(&self) -> &'static str {
        match self {
            TranslationMethod::Google => "Google Translate",
            TranslationMethod::Hf => "Hugging Face",
            TranslationMethod::Baidu => "Baidu",
            TranslationMethod::Bing => "Bing",
        }
    }
}

/// Font the service typesets translated speech bubbles with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontStyle {
    #[default]
    AnimeaceI,
    Mangati,
    Ariali,
}

impl FontStyle {
    pub const ALL: [FontStyle; 3] = [FontStyle::AnimeaceI, FontStyle::Mangati, FontStyle::Ariali];

    /// Wire value sent in the `font` form field
    pub fn as_str(&self) -> &'static str {
        match self {
            FontStyle::AnimeaceI => "animeace_i",
            FontStyle::Mangati => "mangati",
            FontStyle::Ariali => "ariali",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FontStyle::AnimeaceI => "Anime Ace (italic)",
            FontStyle::Mangati => "Manga Temple (italic)",
            FontStyle::Ariali => "Arial (italic)",
        }
    }
}

/// Error returned when parsing an option name that isn't in the known set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOption {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown {}: '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownOption {}

impl FromStr for TranslationMethod {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TranslationMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownOption {
                kind: "translation method",
                value: s.to_string(),
            })
    }
}

impl FromStr for FontStyle {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FontStyle::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownOption {
                kind: "font",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for TranslationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for FontStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The user's current option choices. Always holds one value per option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TranslationConfig {
    pub method: TranslationMethod,
    pub font: FontStyle,
}

impl TranslationConfig {
    pub fn new(method: TranslationMethod, font: FontStyle) -> Self {
        Self { method, font }
    }

    /// Apply a single option change, returning whether anything changed
    pub fn apply(&mut self, option: ConfigOption) -> bool {
        match option {
            ConfigOption::Method(method) if self.method != method => {
                self.method = method;
                true
            }
            ConfigOption::Font(font) if self.font != font => {
                self.font = font;
                true
            }
            _ => false,
        }
    }
}

/// One option/value pair as forwarded by an option picker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOption {
    Method(TranslationMethod),
    Font(FontStyle),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_service_defaults() {
        let config = TranslationConfig::default();
        assert_eq!(config.method.as_str(), "google");
        assert_eq!(config.font.as_str(), "animeace_i");
    }

    #[test]
    fn test_parse_methods() {
        assert_eq!("bing".parse::<TranslationMethod>(), Ok(TranslationMethod::Bing));
        assert_eq!(" HF ".parse::<TranslationMethod>(), Ok(TranslationMethod::Hf));
        let err = "deepl".parse::<TranslationMethod>().unwrap_err();
        assert!(err.to_string().contains("deepl"));
    }

    #[test]
    fn test_parse_fonts() {
        assert_eq!("mangati".parse::<FontStyle>(), Ok(FontStyle::Mangati));
        assert!("comic".parse::<FontStyle>().is_err());
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&TranslationConfig::new(
            TranslationMethod::Baidu,
            FontStyle::AnimeaceI,
        ))
        .unwrap();
        assert_eq!(json, r#"{"method":"baidu","font":"animeace_i"}"#);
    }

    #[test]
    fn test_apply_reports_changes() {
        let mut config = TranslationConfig::default();
        assert!(!config.apply(ConfigOption::Method(TranslationMethod::Google)));
        assert!(config.apply(ConfigOption::Font(FontStyle::Ariali)));
        assert_eq!(config.font, FontStyle::Ariali);
        assert_eq!(config.method, TranslationMethod::Google);
    }
}
