// =============================================================================
// RATE LIMITING
// =============================================================================

/// AI enhancement requests per window per user
pub const ENHANCE_RATE_LIMIT: u32 = 10;

/// GitHub proxy requests per window per user
pub const PROXY_RATE_LIMIT: u32 = 60;

/// Rate limit window (1 hour)
pub const RATE_LIMIT_WINDOW_SECS: u64 = 3600;

// =============================================================================
// FIELD LIMITS
// =============================================================================

/// GitHub caps usernames at 39 characters
pub const MAX_OWNER_LENGTH: usize = 39;

/// Repository name length cap
pub const MAX_REPO_NAME_LENGTH: usize = 100;

/// Ref (branch/tag/SHA) length cap
pub const MAX_REF_LENGTH: usize = 255;

/// Markdown body bounds for the enhancement endpoint
pub const MARKDOWN_MIN_LENGTH: usize = 10;
pub const MARKDOWN_MAX_LENGTH: usize = 10_000;

// =============================================================================
// RELEASE NOTES
// =============================================================================

/// Abbreviated commit hash length used in formatted notes
pub const SHORT_SHA_LENGTH: usize = 7;
