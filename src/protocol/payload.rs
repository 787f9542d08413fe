//! Typed payloads.
//!
//! Shared by realtime events and REST responses. Field names are camelCase
//! on the wire; enum values are lowercase.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Users
// ============================================================================

/// Authenticated user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User ID.
    pub id: String,
    /// Login email.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Role: `admin`, `analyst` or `user`.
    pub role: String,
    /// ISO 8601 creation timestamp.
    pub created_at: String,
}

// ============================================================================
// Transactions
// ============================================================================

/// Channel a transaction originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Mobile app.
    Mobile,
    /// Web banking.
    Web,
    /// Cash machine.
    Atm,
}

/// Kind of money movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Account-to-account transfer.
    Transfer,
    /// Cash withdrawal.
    Withdrawal,
    /// Merchant payment.
    Payment,
    /// Deposit.
    Deposit,
}

/// Screening outcome of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Cleared.
    Approved,
    /// Awaiting screening.
    Pending,
    /// Held for review.
    Suspicious,
    /// Rejected.
    Blocked,
    /// Cleared but marked for follow-up.
    Flagged,
}

impl TransactionStatus {
    /// Returns `true` if the transaction needs analyst attention.
    #[inline]
    #[must_use]
    pub const fn needs_review(self) -> bool {
        matches!(self, Self::Suspicious | Self::Flagged)
    }
}

/// A screened transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Transaction ID.
    pub id: String,
    /// Owning user ID.
    pub user_id: String,
    /// Owning user's display name.
    pub user_name: String,
    /// Formatted amount, e.g. `$25,000.00`.
    pub amount: String,
    /// `City, Country`.
    pub location: String,
    /// Origin channel.
    pub platform: Platform,
    /// Money movement kind.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Screening outcome.
    pub status: TransactionStatus,
    /// Risk score 0-100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<u8>,
    /// ISO 8601 timestamp.
    pub timestamp: String,
    /// Device and network metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

// ============================================================================
// Alerts
// ============================================================================

/// Alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    /// Informational.
    Low,
    /// Worth a look.
    Medium,
    /// Needs prompt action.
    High,
    /// Needs immediate action.
    Critical,
}

/// Alert investigation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    /// Under investigation.
    Investigating,
    /// Awaiting review.
    Reviewing,
    /// Closed.
    Resolved,
    /// Account or transaction blocked.
    Blocked,
}

/// A security alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityAlert {
    /// Alert ID.
    pub id: String,
    /// Short headline.
    pub title: String,
    /// Longer explanation.
    pub description: String,
    /// Severity.
    pub severity: AlertSeverity,
    /// Investigation status.
    pub status: AlertStatus,
    /// Affected user ID.
    pub user_id: String,
    /// Masked account number, e.g. `RW-****4821`.
    pub account_number: String,
    /// ISO 8601 timestamp.
    pub timestamp: String,
    /// Extra alert data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

// ============================================================================
// Monitoring & Risk
// ============================================================================

/// Coarse risk bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Low risk.
    Low,
    /// Medium risk.
    Medium,
    /// High risk.
    High,
}

/// Snapshot of the screening pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemMonitoring {
    /// Whether screening is running.
    pub system_active: bool,
    /// Current throughput.
    pub transactions_per_second: f64,
    /// Transactions processed since start.
    pub total_processed: u64,
    /// Transactions that cleared.
    pub secure_transactions: u64,
    /// Transactions that were flagged.
    pub flagged_transactions: u64,
    /// Success percentage, 0-100.
    pub success_rate: f64,
}

/// Payload of `risk-update`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskUpdate {
    /// Overall risk 0-100.
    pub risk_level: f64,
    /// Risk bucket.
    pub risk_category: RiskLevel,
}

/// Status of one security feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureStatus {
    /// Free-form status, e.g. `active` or `monitoring`.
    pub status: String,
    /// Whether the feature is switched on.
    pub enabled: bool,
}

/// The security features tracked by risk assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityFeatures {
    /// Strong authentication.
    pub authentication: FeatureStatus,
    /// Behavioural analysis.
    pub behavior_analysis: FeatureStatus,
    /// Device fingerprinting.
    pub device_fingerprinting: FeatureStatus,
}

/// Full risk assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    /// Overall risk 0-100.
    pub overall_risk_level: f64,
    /// Risk bucket.
    pub risk_category: RiskLevel,
    /// Feature states.
    pub security_features: SecurityFeatures,
}

/// Transaction volume per location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationActivity {
    /// Row ID.
    pub id: String,
    /// `City, Country`.
    pub location: String,
    /// Transactions observed.
    pub transaction_count: u64,
    /// Risk bucket.
    pub risk_level: RiskLevel,
    /// ISO 8601 timestamp.
    pub timestamp: String,
}

// ============================================================================
// Dashboard, Reports & Settings
// ============================================================================

/// Headline dashboard numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Transactions screened.
    pub total_transactions: u64,
    /// Fraud cases detected.
    pub fraud_detected: u64,
    /// Formatted amount, e.g. `$2,847,592`.
    pub prevented_losses: String,
    /// Formatted percentage, e.g. `99.7%`.
    pub detection_rate: String,
}

/// A generated report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Report ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// `fraud-summary`, `alert-investigation` or `risk-analysis`.
    #[serde(rename = "type")]
    pub kind: String,
    /// `pdf`, `excel` or `csv`.
    pub format: String,
    /// Formatted size, e.g. `2.4 MB`.
    pub size: String,
    /// ISO 8601 timestamp.
    pub generated_at: String,
    /// Download location.
    pub download_url: String,
}

/// Account security toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecuritySettings {
    /// Two-factor authentication.
    pub two_factor_auth: bool,
    /// Alert notifications.
    pub security_alerts: bool,
    /// Live monitoring.
    pub real_time_monitoring: bool,
    /// Automatically block suspicious transactions.
    pub auto_block_suspicious: bool,
}

// ============================================================================
// Filters
// ============================================================================

/// Query filters for the transaction list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilters {
    /// Screening outcome.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TransactionStatus>,
    /// ISO 8601 lower bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    /// ISO 8601 upper bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
    /// Minimum amount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<f64>,
    /// Maximum amount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<f64>,
    /// `City, Country`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Origin channel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    /// Risk bucket.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
}

/// Query filters for the alert list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertFilters {
    /// Severity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<AlertSeverity>,
    /// Investigation status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AlertStatus>,
    /// ISO 8601 lower bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    /// ISO 8601 upper bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
}

// ============================================================================
// Tests
// ============================================================================
