//! Well-known keys in the persistent store, plus last-resort constants.

/// Backend endpoint URL.
pub const BACKEND_URL: &str = "KAMPOS_BACKEND_URL";
/// Anonymous (public) API key.
pub const ANON_KEY: &str = "KAMPOS_ANON_KEY";
/// Service-role API key. Only resolved in trusted execution contexts.
pub const SERVICE_ROLE_KEY: &str = "KAMPOS_SERVICE_ROLE_KEY";

/// Serialized [`kampos_types::Session`], SDK-style token key.
pub const SESSION: &str = "kampos-auth-token";

/// Keys that survive `reinitialize` and sign-out. Everything else in the
/// store is session-scoped and gets purged.
pub const CREDENTIAL_KEYS: [&str; 3] = [BACKEND_URL, ANON_KEY, SERVICE_ROLE_KEY];

/// Last-resort endpoint, kept from the deploy pipeline's static-export
/// placeholder. Resolves but serves nothing.
pub const FALLBACK_BACKEND_URL: &str = "https://placeholder-for-static-export.supabase.co";
/// Last-resort key matching [`FALLBACK_BACKEND_URL`].
pub const FALLBACK_API_KEY: &str = "placeholder-for-static-export";

/// The hardcoded value of last resort for `key`, empty when there is none.
#[must_use]
pub fn fallback_for(key: &str) -> &'static str {
    match key {
        BACKEND_URL => FALLBACK_BACKEND_URL,
        ANON_KEY | SERVICE_ROLE_KEY => FALLBACK_API_KEY,
        _ => "",
    }
}
