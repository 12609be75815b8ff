pub mod user;
pub mod session;

pub use user::{
    User,
    UserRole,
    ProfileData,
    ServiceOffering,
    LoginRequest,
    VerifyOtpRequest,
    UserTypeRequest,
    ChangePasswordRequest,
    ONBOARDING_NOT_STARTED,
    ONBOARDING_IN_PROGRESS,
    ONBOARDING_COMPLETED,
};
pub use session::SessionState;
