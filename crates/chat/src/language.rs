//! Reply language detection (Uzbek, English, Russian).

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Uzbek,
    English,
    Russian,
}

impl Language {
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Uzbek => "uz",
            Self::English => "en",
            Self::Russian => "ru",
        }
    }

    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "uz" => Some(Self::Uzbek),
            "en" => Some(Self::English),
            "ru" => Some(Self::Russian),
            _ => None,
        }
    }

    /// System prompt line asking the model to answer in this language.
    #[must_use]
    pub fn instruction(self) -> &'static str {
        match self {
            Self::Uzbek => "Foydalanuvchi O'zbek tilida yozmoqda. O'zbek tilida javob bering.",
            Self::English => "The user is writing in English. Respond in English.",
            Self::Russian => "Пользователь пишет на русском. Отвечайте на русском языке.",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Apostrophe variants that only appear in Uzbek Latin script.
const UZ_MARKS: &[char] = &['ʻ', 'ʼ'];

const UZ_WORDS: &[&str] = &[
    "va", "bu", "men", "sen", "u", "biz", "siz", "ular", "nima", "qanday", "qachon", "qayer",
    "nega", "kim", "ha", "yoʻq", "yo'q", "iltimos", "rahmat", "kerak", "bor", "qil", "qiling",
    "ber", "ko'r", "menga", "senga", "unga", "bizga", "sizga", "ularga", "kelajak", "bugun",
    "ertaga", "kecha", "hozir", "salom", "xayr", "yaxshi", "yomon", "katta", "kichik", "uyga",
    "maktab", "dars", "kitob", "ish",
];

fn is_cyrillic(c: char) -> bool {
    matches!(c, 'а'..='я' | 'А'..='Я' | 'ё' | 'Ё')
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '\'' || UZ_MARKS.contains(&c)
}

/// Classify text, or `None` when no rule is conclusive.
fn classify(text: &str) -> Option<Language> {
    let total = text.chars().count();
    if total == 0 || text.trim().is_empty() {
        return None;
    }

    let cyrillic = text.chars().filter(|c| is_cyrillic(*c)).count();
    if cyrillic * 10 > total * 3 {
        return Some(Language::Russian);
    }

    let lower = text.to_lowercase();
    let has_uz_word = lower
        .split(|c: char| !is_word_char(c))
        .map(|w| w.trim_matches('\''))
        .any(|w| UZ_WORDS.contains(&w));
    if has_uz_word || text.chars().any(|c| UZ_MARKS.contains(&c)) {
        return Some(Language::Uzbek);
    }

    let latin = text
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .count();
    if latin * 2 > total {
        return Some(Language::English);
    }

    None
}

/// Sticky reply-language tracker.
///
/// Every message is classified; inconclusive messages keep the previous
/// language.
#[derive(Debug, Clone)]
pub struct LanguageDetector {
    current: Language,
}

impl LanguageDetector {
    #[must_use]
    pub fn new(initial: Language) -> Self {
        Self { current: initial }
    }

    /// Classify `text` and make the result the current language.
    pub fn detect(&mut self, text: &str) -> Language {
        if let Some(lang) = classify(text)
            && lang != self.current
        {
            debug!(from = %self.current, to = %lang, "reply language changed");
            self.current = lang;
        }
        self.current
    }

    #[must_use]
    pub fn current(&self) -> Language {
        self.current
    }

    pub fn set(&mut self, lang: Language) {
        self.current = lang;
    }

    #[must_use]
    pub fn instruction(&self) -> &'static str {
        self.current.instruction()
    }
}

impl Default for LanguageDetector {
    fn default() -> Self {
        Self::new(Language::Uzbek)
    }
}
