//! Localization tables and language resolution
//!
//! The backend speaks two languages. Lookup helpers here are pure:
//! no pluralization, no interpolation, no locale negotiation.

use serde::{Deserialize, Serialize};

/// Supported UI languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ru,
    En,
}

impl Language {
    /// Parse a two-letter tag ("ru" / "en"), case-insensitive
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "ru" => Some(Language::Ru),
            "en" => Some(Language::En),
            _ => None,
        }
    }

    /// Resolve the active language: the user's profile tag wins, then the
    /// app-level default, then English.
    pub fn resolve(user_tag: Option<&str>, default_tag: Option<&str>) -> Self {
        user_tag
            .and_then(Self::from_tag)
            .or_else(|| default_tag.and_then(Self::from_tag))
            .unwrap_or(Language::En)
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Language::Ru => "ru",
            Language::En => "en",
        }
    }
}

/// A string the backend ships in both languages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalizedText {
    #[serde(default)]
    pub ru: String,
    #[serde(default)]
    pub en: String,
}

impl LocalizedText {
    /// Pick the variant for `lang`, falling back to the other one if the
    /// requested variant is empty
    pub fn get(&self, lang: Language) -> &str {
        let (wanted, fallback) = match lang {
            Language::Ru => (&self.ru, &self.en),
            Language::En => (&self.en, &self.ru),
        };
        if wanted.is_empty() {
            fallback
        } else {
            wanted
        }
    }
}

/// First-run copy shown by the onboarding flow
#[derive(Debug, Clone, Copy, Serialize)]
pub struct OnboardingTexts {
    pub welcome: &'static str,
    pub choose_story: &'static str,
    pub start: &'static str,
}

/// Onboarding copy for the given language
pub fn onboarding_texts(lang: Language) -> OnboardingTexts {
    match lang {
        Language::Ru => OnboardingTexts {
            welcome: "Добро пожаловать в Fabula! Здесь ты общаешься с героями любимых историй.",
            choose_story: "Выбери историю, чтобы начать",
            start: "Начать",
        },
        Language::En => OnboardingTexts {
            welcome: "Welcome to Fabula! Chat with the heroes of your favorite stories.",
            choose_story: "Choose a story to begin",
            start: "Start",
        },
    }
}

/// Display name for a story key. Unknown keys are title-cased rather
/// than translated.
pub fn story_display_name(key: &str, lang: Language) -> String {
    let known = match (key, lang) {
        ("starwars", Language::En) => Some("Star Wars"),
        ("starwars", Language::Ru) => Some("Звёздные войны"),
        ("harrypotter", Language::En) => Some("Harry Potter"),
        ("harrypotter", Language::Ru) => Some("Гарри Поттер"),
        ("witcher", Language::En) => Some("The Witcher"),
        ("witcher", Language::Ru) => Some("Ведьмак"),
        ("lotr", Language::En) => Some("The Lord of the Rings"),
        ("lotr", Language::Ru) => Some("Властелин колец"),
        _ => None,
    };
    match known {
        Some(name) => name.to_string(),
        None => title_case(key),
    }
}

/// Static UI dictionary. Missing keys come back unchanged so the UI can
/// at least show something.
pub fn translate<'a>(key: &'a str, lang: Language) -> &'a str {
    let entry = match key {
        "balance" => ("Баланс", "Balance"),
        "energy" => ("Энергия", "Energy"),
        "chat" => ("Чат", "Chat"),
        "quests" => ("Задания", "Quests"),
        "store" => ("Магазин", "Store"),
        "cases" => ("Кейсы", "Cases"),
        "open_case" => ("Открыть", "Open"),
        "daily_reward" => ("Ежедневная награда", "Daily reward"),
        "claim" => ("Забрать", "Claim"),
        "invite_friends" => ("Пригласить друзей", "Invite friends"),
        "buy" => ("Купить", "Buy"),
        _ => return key,
    };
    match lang {
        Language::Ru => entry.0,
        Language::En => entry.1,
    }
}

fn title_case(key: &str) -> String {
    key.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_onboarding_welcome_literals() {
        assert_eq!(
            onboarding_texts(Language::Ru).welcome,
            "Добро пожаловать в Fabula! Здесь ты общаешься с героями любимых историй."
        );
        assert_eq!(
            onboarding_texts(Language::En).welcome,
            "Welcome to Fabula! Chat with the heroes of your favorite stories."
        );
    }

    #[test]
    fn test_known_story_names() {
        assert_eq!(story_display_name("starwars", Language::En), "Star Wars");
        assert_eq!(
            story_display_name("starwars", Language::Ru),
            "Звёздные войны"
        );
    }

    #[test]
    fn test_unknown_story_title_cased() {
        assert_eq!(story_display_name("unknown", Language::En), "Unknown");
        assert_eq!(story_display_name("unknown", Language::Ru), "Unknown");
        assert_eq!(
            story_display_name("some story", Language::En),
            "Some Story"
        );
    }

    #[test]
    fn test_language_resolution_chain() {
        assert_eq!(Language::resolve(Some("ru"), Some("en")), Language::Ru);
        assert_eq!(Language::resolve(Some("xx"), Some("ru")), Language::Ru);
        assert_eq!(Language::resolve(None, None), Language::En);
        assert_eq!(Language::resolve(Some("RU"), None), Language::Ru);
    }

    #[test]
    fn test_translate_falls_back_to_key() {
        assert_eq!(translate("quests", Language::Ru), "Задания");
        assert_eq!(translate("no_such_key", Language::En), "no_such_key");
    }

    #[test]
    fn test_localized_text_fallback() {
        let text = LocalizedText {
            ru: String::new(),
            en: "Case".to_string(),
        };
        assert_eq!(text.get(Language::Ru), "Case");
    }
}
