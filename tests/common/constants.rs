//! Shared constants for end-to-end tests
//!
//! When the mock API's fixture data or credentials change, update only this file.

// ============================================================================
// Mock API Credentials
// ============================================================================

pub const TEST_USER: &str = "testuser";
pub const TEST_PASS: &str = "testpass123";

/// Token handed out by the mock login endpoint
pub const TEST_TOKEN: &str = "test-token-abc123";

// ============================================================================
// Fixture IDs
// ============================================================================

pub const USER_1_ID: i64 = 1;
pub const USER_2_ID: i64 = 2;

pub const SONG_1_ID: i64 = 101;
pub const SONG_2_ID: i64 = 102;
pub const SONG_3_ID: i64 = 103;

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for the mock server to accept connections
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Polling interval while waiting for the mock server
pub const SERVER_READY_POLL_MS: u64 = 10;
