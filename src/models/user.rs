use serde::{Deserialize, Serialize};

pub const ONBOARDING_NOT_STARTED: &str = "not_started";
pub const ONBOARDING_IN_PROGRESS: &str = "in_progress";
pub const ONBOARDING_COMPLETED: &str = "completed";

/// Account record as the client app sees it.
///
/// `user_type` keeps whatever casing was stored; compare through
/// [`UserRole::parse`]. `is_verified` is tri-state: records created before
/// OTP verification existed carry no value at all.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
    #[serde(default)]
    pub user_type: Option<String>,
    pub onboarding_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip)]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_data: Option<ProfileData>,
    pub created_at: String,
}

impl User {
    pub fn role(&self) -> Option<UserRole> {
        self.user_type.as_deref().and_then(UserRole::parse)
    }

    pub fn onboarding_completed(&self) -> bool {
        self.onboarding_status == ONBOARDING_COMPLETED
    }

    /// True when the profile, its offerings list, or the list contents are missing.
    pub fn has_no_services(&self) -> bool {
        self.profile_data
            .as_ref()
            .and_then(|p| p.service_offerings.as_ref())
            .map_or(true, |offerings| offerings.is_empty())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Helper,
    Business,
    User,
}

impl UserRole {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_lowercase().as_str() {
            "helper" => Some(UserRole::Helper),
            "business" => Some(UserRole::Business),
            "user" => Some(UserRole::User),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Helper => "helper",
            UserRole::Business => "business",
            UserRole::User => "user",
        }
    }
}

/// Role-specific profile filled in during onboarding. Helper and business
/// profiles share the same record; unused fields stay empty.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    /// Entries are opaque here; only their count matters for routing.
    /// New entries are written as serialized [`ServiceOffering`]s.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_offerings: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub locations: Vec<String>,
}

impl ProfileData {
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.owner_name.as_deref())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOffering {
    #[serde(default)]
    pub id: String,
    pub service_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_unit: Option<PriceUnit>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PriceUnit {
    Hour,
    Day,
    Month,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub phone_number: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub otp: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTypeRequest {
    pub user_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_user() -> User {
        User {
            id: "u1".to_string(),
            phone_number: "+923001234567".to_string(),
            is_verified: None,
            user_type: Some("Helper".to_string()),
            onboarding_status: ONBOARDING_COMPLETED.to_string(),
            name: None,
            password: None,
            profile_data: None,
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn role_parse_ignores_case() {
        assert_eq!(UserRole::parse("BUSINESS"), Some(UserRole::Business));
        assert_eq!(UserRole::parse("helper"), Some(UserRole::Helper));
        assert_eq!(UserRole::parse("admin"), None);
        assert_eq!(bare_user().role(), Some(UserRole::Helper));
    }

    #[test]
    fn missing_profile_counts_as_no_services() {
        let mut user = bare_user();
        assert!(user.has_no_services());

        user.profile_data = Some(ProfileData::default());
        assert!(user.has_no_services());

        user.profile_data = Some(ProfileData {
            service_offerings: Some(Vec::new()),
            ..ProfileData::default()
        });
        assert!(user.has_no_services());
    }

    #[test]
    fn client_json_without_is_verified_deserializes() {
        let user: User = serde_json::from_str(
            r#"{
                "id": "42",
                "phoneNumber": "+923001112233",
                "userType": "user",
                "onboardingStatus": "completed",
                "createdAt": "2026-01-01T00:00:00Z",
                "profileData": { "serviceOfferings": ["cleaning"] }
            }"#,
        )
        .unwrap();

        assert_eq!(user.is_verified, None);
        assert!(!user.has_no_services());
        assert_eq!(user.role(), Some(UserRole::User));
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let mut user = bare_user();
        user.password = Some("$2b$hash".to_string());
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["userType"], "Helper");
    }
}
