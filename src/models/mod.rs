//! Data models for Bayan site content.
//!
//! Every public-facing entity is bilingual: models carry parallel
//! `*_en` / `*_ar` fields and pick one via [`Lang`]. Each model comes
//! with a `*Draft` payload used for create and update calls.

pub mod blog;
pub mod certificate;
pub mod csr;
pub mod gallery;
pub mod project;
pub mod team;

pub use blog::{Blog, BlogDraft};
pub use certificate::{Certificate, CertificateDraft};
pub use csr::{CsrEntry, CsrEntryDraft};
pub use gallery::{GalleryImage, GalleryUpload};
pub use project::{Project, ProjectDraft};
pub use team::{TeamMember, TeamMemberDraft};

/// Site language. The dashboard edits both at once; display helpers on
/// the models pick one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    En,
    Ar,
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lang::En => write!(f, "en"),
            Lang::Ar => write!(f, "ar"),
        }
    }
}
