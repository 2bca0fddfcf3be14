use serde::{Deserialize, Serialize};

use crate::i18n::Language;

/// A value given in both course languages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Localized<T> {
    pub vi: T,
    pub en: T,
}

impl<T> Localized<T> {
    pub fn get(&self, lang: Language) -> &T {
        match lang {
            Language::Vietnamese => &self.vi,
            Language::English => &self.en,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub name: String,
    pub role: Localized<String>,
    pub contributions: Localized<Vec<String>>,
    #[serde(default)]
    pub avatar: Option<String>,
}
