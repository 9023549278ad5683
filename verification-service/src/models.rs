use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Chain a verification/wallet applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum Network {
    Ethereum,
    Bitcoin,
    Tron,
}

impl Network {
    /// Case-folds the wire/HTTP representation. Unknown strings are rejected,
    /// not normalized.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "ethereum" => Some(Network::Ethereum),
            "bitcoin" => Some(Network::Bitcoin),
            "tron" => Some(Network::Tron),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Ethereum => "ethereum",
            Network::Bitcoin => "bitcoin",
            Network::Tron => "tron",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Verification lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Failed,
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Verified => "verified",
            VerificationStatus::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Verification entity - one row per (user_id, network) attempt.
///
/// Invariant: status=Verified implies verified_at is set and
/// verified_at >= created_at.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Verification {
    pub id: uuid::Uuid,
    pub user_id: String,
    pub network: Network,
    pub document_hash: String,
    pub status: VerificationStatus,
    pub created_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
}

// === API request/response models ===

#[derive(Debug, Deserialize)]
pub struct VerificationRequest {
    pub user_id: String,
    pub network: String,
    /// Base64-encoded document bytes.
    pub document: String,
}

#[derive(Debug, Serialize)]
pub struct VerificationResponse {
    pub message: String,
    pub verification_id: uuid::Uuid,
    pub status: String,
}

/// Generic API response envelope, matching the teacher's shape.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: String) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message: Some(message),
        }
    }
}
