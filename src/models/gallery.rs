use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Lang;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryImage {
    pub id: i64,
    pub url: String,
    #[serde(default)]
    pub title_en: Option<String>,
    #[serde(default)]
    pub title_ar: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl GalleryImage {
    pub fn caption(&self, lang: Lang) -> Option<&str> {
        match lang {
            Lang::En => self.title_en.as_deref(),
            Lang::Ar => self.title_ar.as_deref(),
        }
    }
}

/// An image to upload, sent as a multipart form.
///
/// Holds the raw bytes rather than a stream so the request can be
/// rebuilt byte-identical if the security cookie has to be renewed
/// mid-flight.
#[derive(Debug, Clone)]
pub struct GalleryUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
    pub title_en: Option<String>,
    pub title_ar: Option<String>,
}

impl GalleryUpload {
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
            title_en: None,
            title_ar: None,
        }
    }
}
