//! Internationalization (i18n) support
//!
//! The site ships with two built-in locales. Everything user-visible that
//! depends on language lives here: month abbreviations for dates, the
//! reading-time labels and the few fixed UI strings.

use crate::content::ReadingTime;

/// A built-in locale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    PtBr,
    En,
}

const PT_BR_MONTHS: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];

const EN_MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

impl Locale {
    /// Resolve a language tag such as `pt-BR`, `pt` or `en-US`.
    /// Unknown tags fall back to English.
    pub fn from_tag(tag: &str) -> Self {
        let primary = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "pt" => Locale::PtBr,
            "en" => Locale::En,
            _ => {
                tracing::debug!("Unknown language {:?}, using English", tag);
                Locale::En
            }
        }
    }

    /// Value for the `lang` attribute
    pub fn tag(&self) -> &'static str {
        match self {
            Locale::PtBr => "pt-BR",
            Locale::En => "en",
        }
    }

    /// Abbreviated month name, `month` in 1..=12
    pub fn month_abbr(&self, month: u32) -> &'static str {
        let idx = (month.clamp(1, 12) - 1) as usize;
        match self {
            Locale::PtBr => PT_BR_MONTHS[idx],
            Locale::En => EN_MONTHS[idx],
        }
    }

    pub fn reading_time(&self, time: ReadingTime) -> String {
        match (self, time) {
            (Locale::PtBr, ReadingTime::Quick) => "Rápida leitura".to_string(),
            (Locale::PtBr, ReadingTime::Minutes(m)) => format!("{} min", m),
            (Locale::PtBr, ReadingTime::Hours(h)) => format!("{} horas", h),
            (Locale::En, time) => time.to_string(),
        }
    }

    pub fn load_more(&self) -> &'static str {
        match self {
            Locale::PtBr => "Carregar mais posts",
            Locale::En => "Load more posts",
        }
    }

    pub fn loading(&self) -> &'static str {
        match self {
            Locale::PtBr => "Carregando...",
            Locale::En => "Loading...",
        }
    }

    pub fn not_found(&self) -> &'static str {
        match self {
            Locale::PtBr => "Post não encontrado",
            Locale::En => "Post not found",
        }
    }
}
