//! Professional profile fields and their editable form.
//!
//! On the wire an unset field is always `null`; an empty string is never sent.

use serde::{Deserialize, Serialize};

/// Optional professional-profile fields as stored by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessionalProfile {
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub current_position: Option<String>,
    #[serde(default)]
    pub current_company: Option<String>,
}

impl ProfessionalProfile {
    const FIELD_COUNT: usize = 6;

    fn fields(&self) -> [Option<&str>; Self::FIELD_COUNT] {
        [
            self.headline.as_deref(),
            self.summary.as_deref(),
            self.location.as_deref(),
            self.website.as_deref(),
            self.current_position.as_deref(),
            self.current_company.as_deref(),
        ]
    }

    /// Percentage of fields that carry a non-blank value, rounded down.
    pub fn strength(&self) -> u8 {
        let filled = self
            .fields()
            .iter()
            .filter(|f| f.is_some_and(|v| !v.trim().is_empty()))
            .count();
        // filled <= 6, so the result is at most 100
        u8::try_from(filled * 100 / Self::FIELD_COUNT).unwrap_or(100)
    }
}

/// Editable values for the profile editor. Absent server values become empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub headline: String,
    pub summary: String,
    pub location: String,
    pub website: String,
    pub current_position: String,
    pub current_company: String,
}

impl ProfileForm {
    /// Convert to the wire shape; blank values become `None`.
    pub fn to_update(&self) -> ProfessionalProfile {
        ProfessionalProfile {
            headline: unset_if_blank(&self.headline),
            summary: unset_if_blank(&self.summary),
            location: unset_if_blank(&self.location),
            website: unset_if_blank(&self.website),
            current_position: unset_if_blank(&self.current_position),
            current_company: unset_if_blank(&self.current_company),
        }
    }
}

impl From<&ProfessionalProfile> for ProfileForm {
    fn from(profile: &ProfessionalProfile) -> Self {
        Self {
            headline: profile.headline.clone().unwrap_or_default(),
            summary: profile.summary.clone().unwrap_or_default(),
            location: profile.location.clone().unwrap_or_default(),
            website: profile.website.clone().unwrap_or_default(),
            current_position: profile.current_position.clone().unwrap_or_default(),
            current_company: profile.current_company.clone().unwrap_or_default(),
        }
    }
}

fn unset_if_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
