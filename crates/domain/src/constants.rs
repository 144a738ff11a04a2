//! Client-wide constants

/// Prefix applied to relative request paths.
pub const API_V1_PREFIX: &str = "/api/v1/";

/// GraphQL endpoint path.
pub const GRAPHQL_PATH: &str = "/api/graphql";

/// OAuth token endpoint used for refresh.
pub const OAUTH_TOKEN_PATH: &str = "/login/oauth2/token";

/// Accept header value asking Canvas to render ids as strings.
pub const CANVAS_ACCEPT: &str = "application/json+canvas-string-ids";

/// Body marker Canvas uses for throttled requests (served with HTTP 403).
pub const RATE_LIMIT_MARKER: &str = "Rate Limit Exceeded";

pub const DEFAULT_USER_AGENT: &str = concat!("CanvasClient/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RATE_LIMIT_DELAY_MS: u64 = 1_000;
