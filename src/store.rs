//! Persistent per-device session state.
//!
//! A device row ties a client install to the signed-in user and carries the
//! two guide flags. Guide flags survive logout; the user link does not.
//!
//! A link stays unverified until the device confirms an OTP. Until then the
//! snapshot carries only a stub of the account, so nothing stored on the
//! account can be read or changed from that device.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::error::SessionError;
use crate::guide::{self, GuideExit};
use crate::models::{
    ProfileData, ServiceOffering, SessionState, User, UserRole, ONBOARDING_COMPLETED,
    ONBOARDING_IN_PROGRESS, ONBOARDING_NOT_STARTED,
};

const OTP_LEN: usize = 6;
const MIN_PASSWORD_LEN: usize = 6;
/// Wrong guesses allowed before a code is burned.
const MAX_OTP_ATTEMPTS: i64 = 5;

/// A freshly issued verification code. Delivery is up to the caller.
#[derive(Debug, Clone)]
pub struct IssuedOtp {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SessionStore {
    pool: SqlitePool,
    otp_ttl: Duration,
}

impl SessionStore {
    pub fn new(pool: SqlitePool, otp_ttl_secs: i64) -> Self {
        Self {
            pool,
            otp_ttl: Duration::seconds(otp_ttl_secs),
        }
    }

    pub async fn snapshot(&self, device_id: &str) -> Result<SessionState, SessionError> {
        let row = sqlx::query(
            "SELECT user_id, link_verified, beginning_guide_passed, has_seen_guide FROM devices WHERE device_id = ?",
        )
        .bind(device_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(SessionState::default());
        };

        let user = match row.get::<Option<String>, _>("user_id") {
            Some(user_id) if row.get::<bool, _>("link_verified") => self.load_user(&user_id).await?,
            Some(user_id) => self.load_pending_user(&user_id).await?,
            None => None,
        };

        Ok(SessionState {
            is_loading: false,
            is_beginning_guide_passed: row.get::<bool, _>("beginning_guide_passed"),
            user,
            has_seen_guide: row.get::<bool, _>("has_seen_guide"),
        })
    }

    /// Links `phone` to the device and issues a fresh code. The link is
    /// unverified until [`SessionStore::verify_otp`] succeeds; the account's
    /// own state and its other devices are left alone.
    pub async fn login(&self, device_id: &str, phone: &str) -> Result<(User, IssuedOtp), SessionError> {
        let phone = normalize_phone(phone).ok_or(SessionError::InvalidPhone)?;
        self.ensure_device(device_id).await?;

        let existing = sqlx::query("SELECT id FROM users WHERE phone_number = ? LIMIT 1")
            .bind(&phone)
            .fetch_optional(&self.pool)
            .await?;

        let user_id = match existing {
            Some(row) => row.get::<String, _>("id"),
            None => {
                let id = Uuid::new_v4().to_string();
                sqlx::query(
                    "INSERT INTO users (id, phone_number, is_verified, user_type, onboarding_status, created_at) VALUES (?, ?, 0, NULL, ?, ?)",
                )
                .bind(&id)
                .bind(&phone)
                .bind(ONBOARDING_NOT_STARTED)
                .bind(Utc::now().to_rfc3339())
                .execute(&self.pool)
                .await?;
                tracing::info!(user_id = %id, "created user");
                id
            }
        };

        sqlx::query("UPDATE devices SET user_id = ?, link_verified = 0, updated_at = ? WHERE device_id = ?")
            .bind(&user_id)
            .bind(Utc::now().to_rfc3339())
            .bind(device_id)
            .execute(&self.pool)
            .await?;

        let otp = self.issue_otp(&user_id).await?;
        let user = self.load_pending_user(&user_id).await?.ok_or(SessionError::NoUser)?;
        tracing::info!(device_id, user_id = %user.id, "login started");
        Ok((user, otp))
    }

    async fn issue_otp(&self, user_id: &str) -> Result<IssuedOtp, SessionError> {
        let code = format!("{:06}", rand::rng().random_range(0..1_000_000u32));
        let now = Utc::now();
        let expires_at = now + self.otp_ttl;

        sqlx::query("UPDATE otp_codes SET consumed = 1 WHERE user_id = ? AND consumed = 0")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "INSERT INTO otp_codes (id, user_id, code, expires_at, consumed, created_at) VALUES (?, ?, ?, ?, 0, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(&code)
        .bind(expires_at.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(IssuedOtp { code, expires_at })
    }

    pub async fn verify_otp(&self, device_id: &str, code: &str) -> Result<(), SessionError> {
        let user = self.current_user(device_id).await?;
        if code.len() != OTP_LEN || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SessionError::InvalidOtp);
        }

        let row = sqlx::query(
            "SELECT id, code, expires_at, attempts FROM otp_codes WHERE user_id = ? AND consumed = 0 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(&user.id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Err(SessionError::InvalidOtp);
        };
        if row.get::<String, _>("code") != code {
            let attempts = row.get::<i64, _>("attempts") + 1;
            sqlx::query("UPDATE otp_codes SET attempts = ?, consumed = ? WHERE id = ?")
                .bind(attempts)
                .bind(attempts >= MAX_OTP_ATTEMPTS)
                .bind(row.get::<String, _>("id"))
                .execute(&self.pool)
                .await?;
            tracing::warn!(device_id, user_id = %user.id, attempts, "otp mismatch");
            return Err(SessionError::InvalidOtp);
        }
        let expired = DateTime::parse_from_rfc3339(&row.get::<String, _>("expires_at"))
            .map(|t| t.with_timezone(&Utc) <= Utc::now())
            .unwrap_or(true);
        if expired {
            return Err(SessionError::OtpExpired);
        }

        sqlx::query("UPDATE otp_codes SET consumed = 1 WHERE id = ?")
            .bind(row.get::<String, _>("id"))
            .execute(&self.pool)
            .await?;
        sqlx::query("UPDATE users SET is_verified = 1 WHERE id = ?")
            .bind(&user.id)
            .execute(&self.pool)
            .await?;
        sqlx::query("UPDATE devices SET link_verified = 1, updated_at = ? WHERE device_id = ?")
            .bind(Utc::now().to_rfc3339())
            .bind(device_id)
            .execute(&self.pool)
            .await?;

        tracing::info!(device_id, user_id = %user.id, "phone verified");
        Ok(())
    }

    /// Stores the role lowercase. Switching roles clears the role guide flag
    /// since each role has its own guide.
    pub async fn select_user_type(&self, device_id: &str, raw: &str) -> Result<UserRole, SessionError> {
        let role = UserRole::parse(raw).ok_or_else(|| SessionError::InvalidUserType(raw.to_string()))?;
        let user = self.current_verified_user(device_id).await?;

        sqlx::query("UPDATE users SET user_type = ?, onboarding_status = ? WHERE id = ?")
            .bind(role.as_str())
            .bind(ONBOARDING_IN_PROGRESS)
            .bind(&user.id)
            .execute(&self.pool)
            .await?;

        if user.role() != Some(role) {
            sqlx::query("UPDATE devices SET has_seen_guide = 0, updated_at = ? WHERE device_id = ?")
                .bind(Utc::now().to_rfc3339())
                .bind(device_id)
                .execute(&self.pool)
                .await?;
        }

        tracing::info!(device_id, user_id = %user.id, role = role.as_str(), "user type selected");
        Ok(role)
    }

    pub async fn complete_onboarding(&self, device_id: &str, profile: ProfileData) -> Result<(), SessionError> {
        let user = self.current_verified_user(device_id).await?;
        let name = profile.display_name().map(str::to_string);
        let encoded = serde_json::to_string(&profile)?;

        sqlx::query(
            "UPDATE users SET profile_data = ?, onboarding_status = ?, name = COALESCE(?, name) WHERE id = ?",
        )
        .bind(encoded)
        .bind(ONBOARDING_COMPLETED)
        .bind(name)
        .bind(&user.id)
        .execute(&self.pool)
        .await?;

        tracing::info!(device_id, user_id = %user.id, "onboarding completed");
        Ok(())
    }

    pub async fn add_service_offering(
        &self,
        device_id: &str,
        mut offering: ServiceOffering,
    ) -> Result<ServiceOffering, SessionError> {
        let user = self.current_verified_user(device_id).await?;
        if offering.id.is_empty() {
            offering.id = Uuid::new_v4().to_string();
        }

        let mut profile = user.profile_data.unwrap_or_default();
        profile
            .service_offerings
            .get_or_insert_with(Vec::new)
            .push(serde_json::to_value(&offering)?);

        sqlx::query("UPDATE users SET profile_data = ? WHERE id = ?")
            .bind(serde_json::to_string(&profile)?)
            .bind(&user.id)
            .execute(&self.pool)
            .await?;

        Ok(offering)
    }

    /// Marks the first-run guide as passed and, for a signed-in user, the
    /// role guide as seen.
    pub async fn complete_guide(&self, device_id: &str) -> Result<GuideExit, SessionError> {
        self.ensure_device(device_id).await?;
        sqlx::query(
            "UPDATE devices SET beginning_guide_passed = 1, has_seen_guide = CASE WHEN user_id IS NOT NULL AND link_verified = 1 THEN 1 ELSE has_seen_guide END, updated_at = ? WHERE device_id = ?",
        )
        .bind(Utc::now().to_rfc3339())
        .bind(device_id)
        .execute(&self.pool)
        .await?;

        let state = self.snapshot(device_id).await?;
        Ok(guide::exit_after(state.verified_user()))
    }

    pub async fn change_password(&self, device_id: &str, current: &str, new: &str) -> Result<(), SessionError> {
        if new.chars().count() < MIN_PASSWORD_LEN {
            return Err(SessionError::WeakPassword(MIN_PASSWORD_LEN));
        }
        let user = self.current_verified_user(device_id).await?;

        if let Some(hash) = user.password.as_deref() {
            if !bcrypt::verify(current, hash)? {
                return Err(SessionError::IncorrectPassword);
            }
        }

        let hashed = bcrypt::hash(new, bcrypt::DEFAULT_COST)?;
        sqlx::query("UPDATE users SET password = ? WHERE id = ?")
            .bind(hashed)
            .bind(&user.id)
            .execute(&self.pool)
            .await?;

        tracing::info!(device_id, user_id = %user.id, "password changed");
        Ok(())
    }

    pub async fn logout(&self, device_id: &str) -> Result<(), SessionError> {
        sqlx::query("UPDATE devices SET user_id = NULL, link_verified = 0, updated_at = ? WHERE device_id = ?")
            .bind(Utc::now().to_rfc3339())
            .bind(device_id)
            .execute(&self.pool)
            .await?;
        tracing::info!(device_id, "logged out");
        Ok(())
    }

    async fn ensure_device(&self, device_id: &str) -> Result<(), SessionError> {
        sqlx::query("INSERT OR IGNORE INTO devices (device_id, updated_at) VALUES (?, ?)")
            .bind(device_id)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn current_user(&self, device_id: &str) -> Result<User, SessionError> {
        self.snapshot(device_id).await?.user.ok_or(SessionError::NoUser)
    }

    async fn current_verified_user(&self, device_id: &str) -> Result<User, SessionError> {
        let user = self.current_user(device_id).await?;
        if user.is_verified == Some(false) {
            return Err(SessionError::NotVerified);
        }
        Ok(user)
    }

    /// Stand-in for an account whose link to this device is not verified yet.
    async fn load_pending_user(&self, user_id: &str) -> Result<Option<User>, SessionError> {
        let row = sqlx::query("SELECT id, phone_number, created_at FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| User {
            id: r.get::<String, _>("id"),
            phone_number: r.get::<String, _>("phone_number"),
            is_verified: Some(false),
            user_type: None,
            onboarding_status: ONBOARDING_NOT_STARTED.to_string(),
            name: None,
            password: None,
            profile_data: None,
            created_at: r.get::<String, _>("created_at"),
        }))
    }

    async fn load_user(&self, user_id: &str) -> Result<Option<User>, SessionError> {
        let row = sqlx::query(
            "SELECT id, phone_number, is_verified, user_type, onboarding_status, name, password, profile_data, created_at FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| user_from_row(&r)).transpose()
    }
}

fn user_from_row(row: &SqliteRow) -> Result<User, SessionError> {
    let profile_data = row
        .get::<Option<String>, _>("profile_data")
        .map(|raw| serde_json::from_str::<ProfileData>(&raw))
        .transpose()?;

    Ok(User {
        id: row.get::<String, _>("id"),
        phone_number: row.get::<String, _>("phone_number"),
        is_verified: row.get::<Option<bool>, _>("is_verified"),
        user_type: row.get::<Option<String>, _>("user_type"),
        onboarding_status: row.get::<String, _>("onboarding_status"),
        name: row.get::<Option<String>, _>("name"),
        password: row.get::<Option<String>, _>("password"),
        profile_data,
        created_at: row.get::<String, _>("created_at"),
    })
}

/// Strips spacing punctuation and checks for 7 to 15 digits with an
/// optional leading `+`.
fn normalize_phone(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
        .collect();
    let digits = cleaned.strip_prefix('+').unwrap_or(&cleaned);
    let valid = (7..=15).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit());
    valid.then_some(cleaned)
}
