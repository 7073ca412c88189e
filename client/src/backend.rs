//! The backend handle: identity and row API calls.

use kampos_types::{
    AccessToken, ApiKey, AuthUser, BackendUrl, ErrorKind, Session, UserId, UserProfile,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::ClientError;
use crate::{http_client, loopback_http_client};

/// Input to identity creation. The password never appears in `Debug`.
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: String,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("full_name", &self.full_name)
            .field("role", &self.role)
            .finish()
    }
}

impl NewUser {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            full_name: full_name.into(),
            role: kampos_types::DEFAULT_ROLE.to_string(),
        }
    }
}

/// Shared handle to the hosted backend.
///
/// Always constructible: when no usable credential pair exists the handle is
/// a degraded stub whose every operation fails fast with [`ErrorKind::Degraded`]
/// instead of panicking during construction.
pub struct BackendClient {
    inner: ClientInner,
}

enum ClientInner {
    Live(LiveClient),
    Degraded { reason: String },
}

struct LiveClient {
    http: &'static reqwest::Client,
    url: BackendUrl,
    key: ApiKey,
}

/// Password-grant response from the identity API.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

impl BackendClient {
    /// A live handle. Validity of the credential pair is already proven by
    /// the argument types.
    #[must_use]
    pub fn new(url: BackendUrl, key: ApiKey) -> Self {
        let http = if url.is_loopback() {
            loopback_http_client()
        } else {
            http_client()
        };
        Self {
            inner: ClientInner::Live(LiveClient { http, url, key }),
        }
    }

    /// A stub that fails every operation with `reason`.
    #[must_use]
    pub fn degraded(reason: impl Into<String>) -> Self {
        Self {
            inner: ClientInner::Degraded {
                reason: reason.into(),
            },
        }
    }

    #[must_use]
    pub fn is_degraded(&self) -> bool {
        matches!(self.inner, ClientInner::Degraded { .. })
    }

    #[must_use]
    pub fn degraded_reason(&self) -> Option<&str> {
        match &self.inner {
            ClientInner::Degraded { reason } => Some(reason),
            ClientInner::Live(_) => None,
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> Option<&BackendUrl> {
        match &self.inner {
            ClientInner::Live(live) => Some(&live.url),
            ClientInner::Degraded { .. } => None,
        }
    }

    fn live(&self) -> Result<&LiveClient, ClientError> {
        match &self.inner {
            ClientInner::Live(live) => Ok(live),
            ClientInner::Degraded { reason } => Err(ClientError::degraded(reason.clone())),
        }
    }

    // ------------------------------------------------------------------
    // Identity API (/auth/v1)
    // ------------------------------------------------------------------

    /// Create an identity with profile metadata attached, email confirmed
    /// up front. Requires a handle constructed with the service-role key.
    pub async fn create_user(&self, new_user: &NewUser) -> Result<AuthUser, ClientError> {
        let live = self.live()?;
        let body = json!({
            "email": new_user.email,
            "password": new_user.password,
            "email_confirm": true,
            "user_metadata": {
                "full_name": new_user.full_name,
                "role": new_user.role,
            },
        });

        let response = live
            .request(reqwest::Method::POST, "/auth/v1/admin/users", None)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::from_transport(&e))?;
        let response = check(response).await?;
        parse_json(response).await
    }

    /// Password-grant sign-in.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, ClientError> {
        let live = self.live()?;
        let response = live
            .request(
                reqwest::Method::POST,
                "/auth/v1/token?grant_type=password",
                None,
            )
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| ClientError::from_transport(&e))?;
        let response = check(response).await?;
        let token: TokenResponse = parse_json(response).await?;
        Ok(Session {
            access_token: AccessToken::new(token.access_token),
            refresh_token: kampos_types::RefreshToken::new(token.refresh_token),
            expires_at: token.expires_at,
            user: token.user,
        })
    }

    /// Terminate the backend-side session for `token`.
    pub async fn sign_out(&self, token: &AccessToken) -> Result<(), ClientError> {
        let live = self.live()?;
        let response = live
            .request(reqwest::Method::POST, "/auth/v1/logout", Some(token))
            .send()
            .await
            .map_err(|e| ClientError::from_transport(&e))?;
        check(response).await?;
        Ok(())
    }

    /// The identity behind `token`.
    pub async fn get_user(&self, token: &AccessToken) -> Result<AuthUser, ClientError> {
        let live = self.live()?;
        let response = live
            .request(reqwest::Method::GET, "/auth/v1/user", Some(token))
            .send()
            .await
            .map_err(|e| ClientError::from_transport(&e))?;
        let response = check(response).await?;
        parse_json(response).await
    }

    // ------------------------------------------------------------------
    // Row API (/rest/v1)
    // ------------------------------------------------------------------

    /// Single-row read of the mirrored profile. Absence surfaces as
    /// [`ErrorKind::NoRows`], distinguished from real errors.
    pub async fn select_profile(
        &self,
        id: UserId,
        token: Option<&AccessToken>,
    ) -> Result<UserProfile, ClientError> {
        let live = self.live()?;
        let path = format!("/rest/v1/profiles?id=eq.{id}&select=*");
        let response = live
            .request(reqwest::Method::GET, &path, token)
            .header("Accept", "application/vnd.pgrst.object+json")
            .send()
            .await
            .map_err(|e| ClientError::from_transport(&e))?;
        let response = check(response).await?;
        parse_json(response).await
    }

    pub async fn insert_profile(
        &self,
        profile: &UserProfile,
        token: Option<&AccessToken>,
    ) -> Result<(), ClientError> {
        let live = self.live()?;
        let response = live
            .request(reqwest::Method::POST, "/rest/v1/profiles", token)
            .header("Prefer", "return=minimal")
            .json(profile)
            .send()
            .await
            .map_err(|e| ClientError::from_transport(&e))?;
        check(response).await?;
        Ok(())
    }

    /// Insert-or-update on the primary key; used when re-mirroring a
    /// synthesized profile.
    pub async fn upsert_profile(
        &self,
        profile: &UserProfile,
        token: Option<&AccessToken>,
    ) -> Result<(), ClientError> {
        let live = self.live()?;
        let response = live
            .request(reqwest::Method::POST, "/rest/v1/profiles", token)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(profile)
            .send()
            .await
            .map_err(|e| ClientError::from_transport(&e))?;
        check(response).await?;
        Ok(())
    }

    /// Call a database function. Diagnostics-only surface.
    pub async fn rpc(
        &self,
        function: &str,
        token: Option<&AccessToken>,
    ) -> Result<serde_json::Value, ClientError> {
        let live = self.live()?;
        let path = format!("/rest/v1/rpc/{function}");
        let response = live
            .request(reqwest::Method::POST, &path, token)
            .json(&json!({}))
            .send()
            .await
            .map_err(|e| ClientError::from_transport(&e))?;
        let response = check(response).await?;
        parse_json(response).await
    }

    /// Head-only exact count of `profiles`; the cheapest connectivity probe
    /// the backend offers.
    pub async fn count_profiles(&self) -> Result<u64, ClientError> {
        let live = self.live()?;
        let response = live
            .request(
                reqwest::Method::HEAD,
                "/rest/v1/profiles?select=count",
                None,
            )
            .header("Prefer", "count=exact")
            .send()
            .await
            .map_err(|e| ClientError::from_transport(&e))?;
        let response = check(response).await?;

        // Content-Range: 0-24/57 - the count follows the slash.
        let count = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.rsplit('/').next())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        Ok(count)
    }
}

impl LiveClient {
    /// Both surfaces want the same header pair: the `apikey` header always
    /// carries the configured key, while `Authorization` carries the session
    /// token when one exists and the key otherwise.
    fn request(
        &self,
        method: reqwest::Method,
        path_and_query: &str,
        token: Option<&AccessToken>,
    ) -> reqwest::RequestBuilder {
        let url = format!("{}{path_and_query}", self.url.as_str());
        let bearer = token.map_or_else(|| self.key.expose().to_string(), |t| t.expose().to_string());
        self.http
            .request(method, url)
            .header("apikey", self.key.expose())
            .header("Authorization", format!("Bearer {bearer}"))
    }
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let code = status.as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::from_response(code, &body))
}

async fn parse_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    response.json().await.map_err(|e| {
        ClientError::new(ErrorKind::Backend, format!("invalid response body: {e}"))
    })
}
