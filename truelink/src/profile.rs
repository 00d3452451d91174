//! Profile editor.
//!
//! Holds the last server-confirmed profile. Edits are only applied locally
//! after the server accepts them.

use std::sync::{Mutex, PoisonError};

use tracing::info;

use crate::api::{ApiClient, InFlight};
use crate::error::ApiResult;
use crate::models::{ProfessionalProfile, ProfileEnvelope, ProfileForm};

const PROFILE_PATH: &str = "/api/profile/me";

#[derive(Debug)]
pub struct ProfileEditor {
    client: ApiClient,
    loading: InFlight,
    saving: InFlight,
    saved: Mutex<ProfessionalProfile>,
}

impl ProfileEditor {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            loading: InFlight::new(),
            saving: InFlight::new(),
            saved: Mutex::new(ProfessionalProfile::default()),
        }
    }

    /// Fetch the signed-in user's profile and return it as editable values.
    pub async fn load_profile(&self) -> ApiResult<ProfileForm> {
        let _guard = self.loading.begin()?;
        let profile: ProfessionalProfile = self.client.get(PROFILE_PATH, "Failed to load profile").await?;
        let form = ProfileForm::from(&profile);
        *self.saved.lock().unwrap_or_else(PoisonError::into_inner) = profile;
        Ok(form)
    }

    /// Persist the form. Blank values are sent as `null`.
    ///
    /// On failure the previously saved profile is left untouched.
    pub async fn save_profile(&self, form: &ProfileForm) -> ApiResult<ProfessionalProfile> {
        let _guard = self.saving.begin()?;
        let update = form.to_update();
        let resp: ProfileEnvelope = self
            .client
            .put(PROFILE_PATH, &update, "Failed to save profile")
            .await?;
        let profile = resp.into_profile();
        *self.saved.lock().unwrap_or_else(PoisonError::into_inner) = profile.clone();
        info!(strength = profile.strength(), "profile saved");
        Ok(profile)
    }

    /// Last profile confirmed by the server.
    pub fn saved(&self) -> ProfessionalProfile {
        self.saved.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn form(&self) -> ProfileForm {
        ProfileForm::from(&self.saved())
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_busy()
    }

    pub fn is_saving(&self) -> bool {
        self.saving.is_busy()
    }
}
