use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Lang;

/// A corporate social responsibility activity shown on the site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsrEntry {
    pub id: i64,
    pub title_en: String,
    pub title_ar: String,
    pub description_en: String,
    pub description_ar: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl CsrEntry {
    pub fn title(&self, lang: Lang) -> &str {
        match lang {
            Lang::En => &self.title_en,
            Lang::Ar => &self.title_ar,
        }
    }
}

/// Payload for creating or updating a CSR entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CsrEntryDraft {
    pub title_en: String,
    pub title_ar: String,
    pub description_en: String,
    pub description_ar: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}
