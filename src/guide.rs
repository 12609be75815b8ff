//! Guide decks and where the client goes once a guide is finished.

use serde::Serialize;

use crate::i18n::{self, Locale};
use crate::models::{User, UserRole};

const SLIDES_PER_DECK: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuideDeck {
    /// First-run intro, shown before anyone signs in.
    Intro,
    Worker,
    Business,
    Customer,
}

impl GuideDeck {
    fn key(self) -> &'static str {
        match self {
            GuideDeck::Intro => "intro",
            GuideDeck::Worker => "worker",
            GuideDeck::Business => "business",
            GuideDeck::Customer => "customer",
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_last: bool,
}

pub fn deck_for(user: Option<&User>) -> GuideDeck {
    match user {
        None => GuideDeck::Intro,
        Some(u) => match u.role() {
            Some(UserRole::Helper) => GuideDeck::Worker,
            Some(UserRole::Business) => GuideDeck::Business,
            _ => GuideDeck::Customer,
        },
    }
}

pub fn slides(deck: GuideDeck, locale: Locale) -> Vec<Slide> {
    (1..=SLIDES_PER_DECK)
        .map(|n| {
            let base = format!("guide.{}.{}", deck.key(), n);
            Slide {
                id: n.to_string(),
                title: i18n::translate(locale, &format!("{base}.title")).into_owned(),
                description: i18n::translate(locale, &format!("{base}.description")).into_owned(),
                is_last: n == SLIDES_PER_DECK,
            }
        })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuideExit {
    Signup,
    OnboardingStart,
    HelperProfile,
    BusinessProfile,
    MainTabs,
}

impl GuideExit {
    pub fn path(self) -> &'static str {
        match self {
            GuideExit::Signup => "/auth/signup",
            GuideExit::OnboardingStart => "/onboarding/start",
            GuideExit::HelperProfile => "/onboarding/helper-profile",
            GuideExit::BusinessProfile => "/onboarding/business-profile",
            GuideExit::MainTabs => "/(tabs)",
        }
    }
}

/// Helpers who already finished onboarding land on their profile so they
/// can add the services they are missing.
pub fn exit_after(user: Option<&User>) -> GuideExit {
    let Some(user) = user else {
        return GuideExit::Signup;
    };
    match user.role() {
        Some(UserRole::Helper) if user.onboarding_completed() => GuideExit::HelperProfile,
        Some(UserRole::Helper) => GuideExit::OnboardingStart,
        Some(UserRole::Business) => GuideExit::BusinessProfile,
        _ => GuideExit::MainTabs,
    }
}
