use serde::{Deserialize, Serialize};

use super::Lang;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: i64,
    pub name_en: String,
    pub name_ar: String,
    pub role_en: String,
    pub role_ar: String,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub sort_order: Option<i32>,
}

impl TeamMember {
    pub fn name(&self, lang: Lang) -> &str {
        match lang {
            Lang::En => &self.name_en,
            Lang::Ar => &self.name_ar,
        }
    }

    pub fn role(&self, lang: Lang) -> &str {
        match lang {
            Lang::En => &self.role_en,
            Lang::Ar => &self.role_ar,
        }
    }
}

/// Payload for creating or updating a team member
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamMemberDraft {
    pub name_en: String,
    pub name_ar: String,
    pub role_en: String,
    pub role_ar: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
}
