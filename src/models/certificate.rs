use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Lang;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Certificate {
    pub id: i64,
    pub title_en: String,
    pub title_ar: String,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub issued_at: Option<NaiveDate>,
}

impl Certificate {
    pub fn title(&self, lang: Lang) -> &str {
        match lang {
            Lang::En => &self.title_en,
            Lang::Ar => &self.title_ar,
        }
    }
}

/// Payload for creating or updating a certificate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CertificateDraft {
    pub title_en: String,
    pub title_ar: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<NaiveDate>,
}
