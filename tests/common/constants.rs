//! Shared constants for end-to-end tests
//!
//! This module contains all constants used across the test suite.
//! When test data changes (admin credentials, seed records, etc.),
//! update only this file.

// ============================================================================
// Admin Credentials
// ============================================================================

/// Admin username configured on every test server
pub const ADMIN_USER: &str = "admin";

/// Admin password configured on every test server
pub const ADMIN_PASS: &str = "adminpass123";

/// Secret used to sign test session tokens
pub const TOKEN_SECRET: &str = "e2e-test-token-secret";

// ============================================================================
// Seed Records
// ============================================================================

/// Title of the seeded movie record
pub const SEED_MOVIE_TITLE: &str = "Akira";

/// Title of the seeded series record
pub const SEED_SERIES_TITLE: &str = "Monster";

/// Title of the seeded game record
pub const SEED_GAME_TITLE: &str = "Outer Wilds";

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
