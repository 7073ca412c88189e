//! Runtime diagnostics: connection, session, and SQL-setup probes.
//!
//! Statically-exported production builds compile with the `diagnostics`
//! feature off; both probes then answer a fixed placeholder payload and
//! never touch the backend.

use serde::Serialize;

use crate::service::AuthService;

#[cfg(not(feature = "diagnostics"))]
const RUNTIME_ONLY: &str = "Esta comprobación só está dispoñible en tempo de execución";

/// Outcome of the auth-status probe.
#[derive(Debug, Clone, Serialize)]
pub struct AuthStatusReport {
    /// False in builds where the probe is compiled out.
    pub runtime_available: bool,
    pub message: String,
    pub connection_ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_error: Option<String>,
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_email: Option<String>,
    /// Whether the cached access token is still accepted by the backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_valid: Option<bool>,
    /// `Some(false)` means authenticated but the mirrored row is absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_found: Option<bool>,
    pub env: EnvReport,
}

/// Presence (never the values) of the configured credential pair.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EnvReport {
    /// Endpoint truncated to a recognizable prefix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anon_key_len: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_key_len: Option<usize>,
}

/// Outcome of the SQL-setup probe.
#[derive(Debug, Clone, Serialize)]
pub struct SqlConfigReport {
    pub runtime_available: bool,
    pub success: bool,
    pub configuration_applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_email_confirmation: Option<bool>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

#[cfg(not(feature = "diagnostics"))]
impl AuthStatusReport {
    fn placeholder() -> Self {
        Self {
            runtime_available: false,
            message: RUNTIME_ONLY.to_string(),
            connection_ok: false,
            connection_error: None,
            authenticated: false,
            session_email: None,
            token_valid: None,
            profile_found: None,
            env: EnvReport::default(),
        }
    }
}

#[cfg(not(feature = "diagnostics"))]
impl SqlConfigReport {
    fn placeholder() -> Self {
        Self {
            runtime_available: false,
            success: false,
            configuration_applied: false,
            requires_email_confirmation: None,
            message: RUNTIME_ONLY.to_string(),
            recommendation: None,
        }
    }
}

/// Connection + session + env probe, the debug page's checklist.
#[cfg(feature = "diagnostics")]
pub async fn check_auth_status(service: &AuthService) -> AuthStatusReport {
    use kampos_config::keys;

    let manager = service.manager();
    let client = manager.client();

    let (connection_ok, connection_error) = match client.count_profiles().await {
        Ok(count) => {
            tracing::debug!(count, "Connection probe succeeded");
            (true, None)
        }
        Err(err) => (false, Some(err.to_string())),
    };

    let session = manager.session();
    let authenticated = session.is_some();
    let session_email = session.as_ref().map(|s| s.user.email.clone());

    let token_valid = match &session {
        Some(session) => Some(client.get_user(&session.access_token).await.is_ok()),
        None => None,
    };

    let profile_found = match &session {
        Some(session) => match client
            .select_profile(session.user.id, Some(&session.access_token))
            .await
        {
            Ok(_) => Some(true),
            Err(err) if err.kind.is_missing_profile() => Some(false),
            Err(_) => None,
        },
        None => None,
    };

    let env = match manager.store() {
        Some(store) => EnvReport {
            url_prefix: store
                .get(keys::BACKEND_URL)
                .map(|url| url.chars().take(15).collect()),
            anon_key_len: store.get(keys::ANON_KEY).map(|key| key.len()),
            service_key_len: store.get(keys::SERVICE_ROLE_KEY).map(|key| key.len()),
        },
        None => EnvReport::default(),
    };

    let message = if connection_ok {
        "Conexión co servidor verificada correctamente".to_string()
    } else {
        "Non se puido verificar a conexión co servidor".to_string()
    };

    AuthStatusReport {
        runtime_available: true,
        message,
        connection_ok,
        connection_error,
        authenticated,
        session_email,
        token_valid,
        profile_found,
        env,
    }
}

#[cfg(not(feature = "diagnostics"))]
pub async fn check_auth_status(_service: &AuthService) -> AuthStatusReport {
    AuthStatusReport::placeholder()
}

/// Asks the backend whether the email-confirmation disabling setup was
/// applied. Needs the service-role key.
#[cfg(feature = "diagnostics")]
pub async fn check_sql_config(service: &AuthService) -> SqlConfigReport {
    const RECOMMENDATION: &str =
        "Executa o script SQL disable_emails.sql no panel de administración do servidor";

    let privileged = match service.manager().privileged_client() {
        Ok(client) => client,
        Err(err) => {
            return SqlConfigReport {
                runtime_available: true,
                success: false,
                configuration_applied: false,
                requires_email_confirmation: None,
                message: format!("Non se puido construír o cliente privilexiado: {err}"),
                recommendation: Some(RECOMMENDATION.to_string()),
            };
        }
    };

    match privileged.rpc("check_email_confirmation_settings", None).await {
        Ok(value) => {
            let requires = value
                .get("requires_email_confirmation")
                .and_then(serde_json::Value::as_bool);
            let applied = requires == Some(false);
            SqlConfigReport {
                runtime_available: true,
                success: true,
                configuration_applied: applied,
                requires_email_confirmation: requires,
                message: if applied {
                    "A configuración para desactivar emails está aplicada correctamente".to_string()
                } else {
                    "ATENCIÓN: a verificación de email segue activada".to_string()
                },
                recommendation: if applied {
                    None
                } else {
                    Some(RECOMMENDATION.to_string())
                },
            }
        }
        Err(err) => SqlConfigReport {
            runtime_available: true,
            success: false,
            configuration_applied: false,
            requires_email_confirmation: None,
            message: format!("Non se puido verificar a configuración SQL: {err}"),
            recommendation: Some(RECOMMENDATION.to_string()),
        },
    }
}

#[cfg(not(feature = "diagnostics"))]
pub async fn check_sql_config(_service: &AuthService) -> SqlConfigReport {
    SqlConfigReport::placeholder()
}
