//! Catalogue of the marketplace REST endpoints the mobile client calls.

use std::borrow::Cow;

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Endpoint {
    pub group: &'static str,
    pub name: &'static str,
    pub path: &'static str,
}

const fn ep(group: &'static str, name: &'static str, path: &'static str) -> Endpoint {
    Endpoint { group, name, path }
}

pub const ENDPOINTS: &[Endpoint] = &[
    ep("auth", "login", "/login"),
    ep("auth", "register", "/register"),
    ep("auth", "verify", "/verify-otp"),
    ep("auth", "logout", "/logout"),
    ep("auth", "forgot_password", "/forgot-password"),
    ep("auth", "reset_password", "/reset-password"),
    ep("auth", "reset_password_with_token", "/reset-password/:token"),
    ep("service_types", "list", "/service-types"),
    ep("profile", "get", "/profile"),
    ep("profile", "update", "/profile"),
    ep("profile", "photo", "/profile/photo"),
    ep("password", "update", "/password"),
    ep("onboarding", "helper", "/onboarding/helper"),
    ep("onboarding", "business", "/onboarding/business"),
    ep("jobs", "browse", "/bookings/browse"),
    ep("job_posts", "list", "/job-posts"),
    ep("job_posts", "browse", "/bookings/browse"),
    ep("job_posts", "my_posts", "/my-job-posts"),
    ep("job_posts", "create_form", "/job-posts/create"),
    ep("job_posts", "create", "/bookings"),
    ep("job_posts", "get", "/job-posts/:id"),
    ep("job_posts", "update", "/job-posts/:id"),
    ep("job_posts", "delete", "/job-posts/:id"),
    ep("bookings", "list", "/bookings"),
    ep("bookings", "create_form", "/bookings/create"),
    ep("bookings", "create", "/bookings"),
    ep("bookings", "get", "/bookings/:id"),
    ep("bookings", "update", "/bookings/:id"),
    ep("bookings", "delete", "/bookings/:id"),
    ep("bookings", "apply", "/bookings/:id/apply"),
    ep("bookings", "review", "/bookings/:id/review"),
    ep("bookings", "create_review", "/bookings/:id/review/create"),
    ep("job_applications", "list", "/job-applications"),
    ep("job_applications", "get", "/job-applications/:id"),
    ep("job_applications", "accept", "/job-applications/:id/accept"),
    ep("job_applications", "reject", "/job-applications/:id/reject"),
    ep("job_applications", "withdraw", "/job-applications/:id/withdraw"),
    ep("job_applications", "my_applications", "/my-applications"),
    ep("job_applications", "my_request_applications", "/my-request-applications"),
    ep("helpers", "list", "/helpers"),
    ep("helpers", "create", "/helpers"),
    ep("helpers", "get", "/helpers/:id"),
    ep("helpers", "edit", "/helpers/:id/edit"),
    ep("businesses", "list", "/businesses"),
    ep("businesses", "create", "/businesses"),
    ep("businesses", "get", "/businesses/:id"),
    ep("businesses", "edit", "/businesses/:id/edit"),
    ep("service_listings", "list", "/service-listings"),
    ep("service_listings", "create", "/service-listings"),
    ep("service_listings", "get", "/service-listings/:id"),
    ep("service_listings", "update", "/service-listings/:id"),
    ep("service_listings", "delete", "/service-listings/:id"),
    ep("service_listings", "my_listings", "/service-listings/my-service-listings"),
    ep("reviews", "get", "/reviews/:id"),
    ep("reviews", "edit", "/reviews/:id/edit"),
    ep("messages", "conversations", "/conversations"),
    ep("messages", "create_conversation", "/conversations"),
    ep("messages", "get_messages", "/conversations/:id/messages"),
    ep("messages", "delete_conversation", "/conversations/:id"),
    ep("messages", "send", "/messages"),
    ep("messages", "delete", "/messages/:id"),
    ep("locations", "search", "/locations/search"),
    ep("locations", "karachi_search", "/karachi-locations/search"),
    ep("cities", "list", "/cities"),
    ep("notifications", "list", "/notifications"),
    ep("notifications", "unread_count", "/notifications/unread-count"),
    ep("notifications", "mark_read", "/notifications/:id/read"),
    ep("notifications", "mark_all_read", "/notifications/read-all"),
    ep("home", "get", "/home"),
    ep("support", "contact", "/contact"),
    ep("support", "faq", "/faq"),
    ep("legal", "terms", "/terms"),
    ep("legal", "privacy", "/privacy"),
    ep("legal", "about", "/about"),
    ep("languages", "list", "/languages"),
];

pub fn find(group: &str, name: &str) -> Option<&'static Endpoint> {
    ENDPOINTS.iter().find(|e| e.group == group && e.name == name)
}

/// Joins `base` and `path`, substituting `:name` segments from `params`.
/// Substituted values are percent-encoded so they stay a single segment.
/// Segments without a matching parameter are left as they are.
pub fn build_url(base: &str, path: &str, params: &[(&str, &str)]) -> String {
    let resolved = path
        .split('/')
        .map(|segment| {
            segment
                .strip_prefix(':')
                .and_then(|name| params.iter().find(|(k, _)| *k == name))
                .map_or(Cow::Borrowed(segment), |(_, v)| encode_segment(v))
        })
        .collect::<Vec<_>>()
        .join("/");
    format!("{}{}", base.trim_end_matches('/'), resolved)
}

fn encode_segment(value: &str) -> Cow<'_, str> {
    // dot segments survive percent-encoding untouched
    match value {
        "." => Cow::Borrowed("%2E"),
        ".." => Cow::Borrowed("%2E%2E"),
        _ => urlencoding::encode(value),
    }
}
