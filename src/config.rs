use std::env;
use std::str::FromStr;
use chrono_tz::Tz;

/// What approval does when the chosen slot is already held by another active booking.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Approve anyway and report the conflicting bookings back to the teacher.
    Warn,
    /// Refuse with 409 unless the teacher explicitly forces the approval.
    Block,
}

impl FromStr for ConflictPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "warn" => Ok(ConflictPolicy::Warn),
            "block" => Ok(ConflictPolicy::Block),
            other => Err(format!("unknown conflict policy '{}'", other)),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub timezone: Tz,
    pub approval_conflict_policy: ConflictPolicy,
    pub signature_dir: String,
    pub signature_base_url: String,
    pub max_signature_bytes: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            timezone: env::var("TIMEZONE").unwrap_or_else(|_| "Asia/Seoul".to_string()).parse().expect("TIMEZONE must be an IANA timezone name"),
            approval_conflict_policy: env::var("APPROVAL_CONFLICT_POLICY").unwrap_or_else(|_| "warn".to_string()).parse().expect("APPROVAL_CONFLICT_POLICY must be 'warn' or 'block'"),
            signature_dir: env::var("SIGNATURE_DIR").unwrap_or_else(|_| "./data/signatures".to_string()),
            signature_base_url: env::var("SIGNATURE_BASE_URL").unwrap_or_else(|_| "/signatures".to_string()),
            max_signature_bytes: env::var("MAX_SIGNATURE_BYTES").unwrap_or_else(|_| "1048576".to_string()).parse().expect("MAX_SIGNATURE_BYTES must be a number"),
        }
    }
}
