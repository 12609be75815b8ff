//! Maps a session snapshot to the one screen the client should show next.
//!
//! Rules are checked top-down and the first match wins. The order matters:
//! the first-run intro guide outranks authentication, and helpers who
//! finished onboarding without declaring any service are sent back to the
//! guide instead of the main tabs.

use serde::{Deserialize, Serialize};

use crate::models::{SessionState, UserRole};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    Loading,
    Guide,
    PhoneLogin,
    OtpVerify,
    UserTypeSelect,
    OnboardingStart,
    MainTabs,
}

impl Destination {
    /// Client route for this destination.
    pub fn path(self) -> &'static str {
        match self {
            Destination::Loading => "/",
            Destination::Guide => "/guide",
            Destination::PhoneLogin => "/auth/phone-login",
            Destination::OtpVerify => "/auth/otp-verify",
            Destination::UserTypeSelect => "/auth/user-type",
            Destination::OnboardingStart => "/onboarding/start",
            Destination::MainTabs => "/(tabs)",
        }
    }
}

pub fn resolve(state: &SessionState) -> Destination {
    if state.is_loading {
        return Destination::Loading;
    }

    if !state.is_beginning_guide_passed {
        return Destination::Guide;
    }

    let Some(user) = state.user.as_ref() else {
        return Destination::PhoneLogin;
    };

    // Only an explicit `false` means unverified.
    if user.is_verified == Some(false) {
        return Destination::OtpVerify;
    }

    let Some(user_type) = user.user_type.as_deref() else {
        return Destination::UserTypeSelect;
    };

    let completed = user.onboarding_completed();
    let needs_role_guide = match UserRole::parse(user_type) {
        Some(UserRole::Helper) => {
            !state.has_seen_guide || (completed && user.has_no_services())
        }
        Some(UserRole::Business) => !state.has_seen_guide,
        Some(UserRole::User) => !state.has_seen_guide && completed,
        None => false,
    };
    if needs_role_guide {
        return Destination::Guide;
    }

    if !completed {
        return Destination::OnboardingStart;
    }

    Destination::MainTabs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProfileData, User, ONBOARDING_COMPLETED, ONBOARDING_IN_PROGRESS};
    use serde_json::json;

    fn user(user_type: Option<&str>, onboarding: &str) -> User {
        User {
            id: "u1".to_string(),
            phone_number: "+923001234567".to_string(),
            is_verified: Some(true),
            user_type: user_type.map(str::to_string),
            onboarding_status: onboarding.to_string(),
            name: None,
            password: None,
            profile_data: None,
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    fn with_services(mut user: User, services: Vec<serde_json::Value>) -> User {
        user.profile_data = Some(ProfileData {
            service_offerings: Some(services),
            ..ProfileData::default()
        });
        user
    }

    fn signed_in(user: User, has_seen_guide: bool) -> SessionState {
        SessionState {
            is_loading: false,
            is_beginning_guide_passed: true,
            user: Some(user),
            has_seen_guide,
        }
    }

    #[test]
    fn loading_wins_over_everything() {
        let mut state = signed_in(user(Some("helper"), ONBOARDING_COMPLETED), true);
        state.is_loading = true;
        assert_eq!(resolve(&state), Destination::Loading);

        let state = SessionState {
            is_loading: true,
            ..SessionState::default()
        };
        assert_eq!(resolve(&state), Destination::Loading);
    }

    #[test]
    fn beginning_guide_outranks_authentication() {
        let guest = SessionState::default();
        assert_eq!(resolve(&guest), Destination::Guide);

        let mut state = signed_in(user(Some("user"), ONBOARDING_COMPLETED), true);
        state.is_beginning_guide_passed = false;
        assert_eq!(resolve(&state), Destination::Guide);
    }

    #[test]
    fn guest_goes_to_phone_login() {
        let state = SessionState {
            is_beginning_guide_passed: true,
            ..SessionState::default()
        };
        assert_eq!(resolve(&state), Destination::PhoneLogin);
    }

    #[test]
    fn only_explicit_false_requires_otp() {
        let mut u = with_services(user(Some("helper"), ONBOARDING_COMPLETED), vec![json!("cleaning")]);
        u.is_verified = Some(false);
        assert_eq!(resolve(&signed_in(u.clone(), true)), Destination::OtpVerify);

        u.is_verified = None;
        assert_eq!(resolve(&signed_in(u, true)), Destination::MainTabs);
    }

    #[test]
    fn missing_user_type_goes_to_type_select() {
        let state = signed_in(user(None, ONBOARDING_COMPLETED), true);
        assert_eq!(resolve(&state), Destination::UserTypeSelect);
    }

    #[test]
    fn helper_without_services_is_regated_to_guide() {
        let u = with_services(user(Some("helper"), ONBOARDING_COMPLETED), Vec::new());
        assert_eq!(resolve(&signed_in(u, true)), Destination::Guide);

        let no_profile = user(Some("helper"), ONBOARDING_COMPLETED);
        assert_eq!(resolve(&signed_in(no_profile, true)), Destination::Guide);
    }

    #[test]
    fn helper_with_services_reaches_main_tabs() {
        let u = with_services(user(Some("helper"), ONBOARDING_COMPLETED), vec![json!("cleaning")]);
        assert_eq!(resolve(&signed_in(u, true)), Destination::MainTabs);
    }

    #[test]
    fn helper_sees_guide_before_onboarding() {
        let u = user(Some("helper"), ONBOARDING_IN_PROGRESS);
        assert_eq!(resolve(&signed_in(u.clone(), false)), Destination::Guide);
        assert_eq!(resolve(&signed_in(u, true)), Destination::OnboardingStart);
    }

    #[test]
    fn business_role_matches_case_insensitively() {
        let u = user(Some("Business"), ONBOARDING_IN_PROGRESS);
        assert_eq!(resolve(&signed_in(u, false)), Destination::Guide);
    }

    #[test]
    fn business_with_seen_guide_falls_through_to_onboarding() {
        let u = user(Some("business"), ONBOARDING_IN_PROGRESS);
        assert_eq!(resolve(&signed_in(u, true)), Destination::OnboardingStart);

        let done = user(Some("business"), ONBOARDING_COMPLETED);
        assert_eq!(resolve(&signed_in(done, true)), Destination::MainTabs);
    }

    #[test]
    fn customer_sees_guide_only_after_onboarding() {
        let pending = user(Some("user"), ONBOARDING_IN_PROGRESS);
        assert_eq!(resolve(&signed_in(pending, false)), Destination::OnboardingStart);

        let done = user(Some("USER"), ONBOARDING_COMPLETED);
        assert_eq!(resolve(&signed_in(done.clone(), false)), Destination::Guide);
        assert_eq!(resolve(&signed_in(done, true)), Destination::MainTabs);
    }

    #[test]
    fn unknown_role_skips_role_guides() {
        let pending = user(Some("admin"), "not_started");
        assert_eq!(resolve(&signed_in(pending, false)), Destination::OnboardingStart);

        let done = user(Some("admin"), ONBOARDING_COMPLETED);
        assert_eq!(resolve(&signed_in(done, false)), Destination::MainTabs);
    }

    #[test]
    fn resolving_twice_gives_same_answer() {
        let u = with_services(user(Some("helper"), ONBOARDING_COMPLETED), Vec::new());
        let state = signed_in(u, true);
        assert_eq!(resolve(&state), resolve(&state));
    }

    #[test]
    fn destinations_serialize_as_snake_case() {
        assert_eq!(serde_json::to_value(Destination::MainTabs).unwrap(), json!("main_tabs"));
        assert_eq!(Destination::OtpVerify.path(), "/auth/otp-verify");
    }
}
