//! Dashboard REST API.
//!
//! [`ApiClient`] wraps every endpoint the dashboard reads or writes and
//! unwraps the standard `{success, data, message?, error?}` envelope into
//! typed results.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `client` | [`ApiClient`] and the [`Navigator`] seam |
//! | `endpoints` | Endpoint paths |
//! | `http` | [`HttpTransport`] seam and [`ReqwestTransport`] |
//! | `types` | Envelopes and auth bodies |

// ============================================================================
// Submodules
// ============================================================================

/// Typed REST client.
pub mod client;

/// Endpoint paths.
pub mod endpoints;

/// HTTP transport seam.
pub mod http;

/// Envelopes and auth bodies.
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::{ApiClient, DEFAULT_PAGE_SIZE, Navigator, messages};
pub use http::{HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport};
pub use types::{
    ApiResponse, AuthResponse, LoginRequest, Page, PaginatedResponse, Pagination, RegisterRequest,
};
