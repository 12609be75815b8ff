use serde::{Deserialize, Serialize};

use super::User;

/// Read-only view of one device's session, rebuilt after every mutation.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    #[serde(default)]
    pub is_loading: bool,
    #[serde(default)]
    pub is_beginning_guide_passed: bool,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub has_seen_guide: bool,
}

impl SessionState {
    /// The signed-in user, unless they still owe an OTP.
    pub fn verified_user(&self) -> Option<&User> {
        self.user.as_ref().filter(|u| u.is_verified != Some(false))
    }
}
