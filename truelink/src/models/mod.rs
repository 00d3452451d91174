//! Wire types exchanged with the TrueLink API.

mod connection;
mod profile;
mod user;

pub use connection::{Connection, ConnectionRequest, Decision};
pub use profile::{ProfessionalProfile, ProfileForm};
pub use user::{AuthResponse, User, UserSummary};

use serde::Deserialize;

/// `GET /api/connections/search` envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchEnvelope {
    #[serde(default)]
    pub users: Vec<UserSummary>,
}

/// `GET /api/connections/requests` envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct RequestsEnvelope {
    #[serde(default)]
    pub requests: Vec<ConnectionRequest>,
}

/// `GET /api/connections` envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct ConnectionsEnvelope {
    #[serde(default)]
    pub connections: Vec<Connection>,
}

/// `PUT /api/profile/me` answers with either the bare profile or `{message, profile}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ProfileEnvelope {
    Wrapped { profile: ProfessionalProfile },
    Bare(ProfessionalProfile),
}

impl ProfileEnvelope {
    pub fn into_profile(self) -> ProfessionalProfile {
        match self {
            Self::Wrapped { profile } | Self::Bare(profile) => profile,
        }
    }
}
