//! REST endpoint paths, relative to the API base URL.

use std::borrow::Cow;

// ============================================================================
// Static Paths
// ============================================================================

/// `POST` credentials, returns user and tokens.
pub const LOGIN: &str = "/auth/login";

/// `POST` registration form, returns user and tokens.
pub const REGISTER: &str = "/auth/register";

/// `POST` ends the server-side session.
pub const LOGOUT: &str = "/auth/logout";

/// `GET` the authenticated user.
pub const PROFILE: &str = "/auth/profile";

/// `GET` headline counters.
pub const DASHBOARD_STATS: &str = "/dashboard/stats";

/// `GET` paged transaction list.
pub const TRANSACTIONS: &str = "/transactions";

/// `GET` paged alert list.
pub const ALERTS: &str = "/alerts";

/// `GET` generated reports.
pub const REPORTS: &str = "/reports";

/// `GET`/`PUT` account security toggles.
pub const SECURITY_SETTINGS: &str = "/settings/security";

/// `GET` live processing counters.
pub const SYSTEM_STATUS: &str = "/monitoring/system";

/// `GET` current risk assessment.
pub const RISK_ASSESSMENT: &str = "/monitoring/risk";

/// Client route shown after the session is rejected.
pub const SIGN_IN_ROUTE: &str = "/auth/signin";

// ============================================================================
// Parameterised Paths
// ============================================================================

/// `GET /transactions/:id`.
#[must_use]
pub fn transaction_details(id: &str) -> String {
    format!("{TRANSACTIONS}/{}", encode(id))
}

/// `PUT /alerts/:id/status`.
#[must_use]
pub fn alert_status(id: &str) -> String {
    format!("{ALERTS}/{}/status", encode(id))
}

fn encode(segment: &str) -> Cow<'_, str> {
    urlencoding::encode(segment)
}

// ============================================================================
// Tests
// ============================================================================
