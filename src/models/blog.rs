use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Lang;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blog {
    pub id: i64,
    pub title_en: String,
    pub title_ar: String,
    pub body_en: String,
    pub body_ar: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Blog {
    pub fn title(&self, lang: Lang) -> &str {
        match lang {
            Lang::En => &self.title_en,
            Lang::Ar => &self.title_ar,
        }
    }

    pub fn is_published(&self) -> bool {
        self.published_at.map(|at| at <= Utc::now()).unwrap_or(false)
    }
}

/// Payload for creating or updating a blog post
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlogDraft {
    pub title_en: String,
    pub title_ar: String,
    pub body_en: String,
    pub body_ar: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}
