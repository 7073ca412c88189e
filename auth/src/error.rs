//! Normalized operation error with its localized user-facing message.

use kampos_client::ClientError;
use kampos_types::ErrorKind;
use thiserror::Error;

use crate::guard::OpKind;

#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct AuthError {
    pub kind: ErrorKind,
    /// Technical detail, for logs. User-facing text comes from
    /// [`AuthError::user_message`].
    pub message: String,
}

impl AuthError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Synthetic caller-side timeout; distinct from backend errors.
    #[must_use]
    pub fn timeout(op: OpKind) -> Self {
        Self::new(
            ErrorKind::Timeout,
            format!("operation {op} exceeded its wall-clock budget"),
        )
    }

    /// The message shown to the user. Mapped here once; callers never
    /// pattern-match message text.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self.kind {
            ErrorKind::InvalidCredentials => {
                "Credenciais incorrectos. Comproba o teu correo e contrasinal.".to_string()
            }
            ErrorKind::AlreadyRegistered => {
                "Este correo electrónico xa está rexistrado. Por favor inicia sesión.".to_string()
            }
            ErrorKind::InvalidApiKey => {
                "Erro de configuración: a clave API non é válida. Contacta ao administrador."
                    .to_string()
            }
            ErrorKind::Network => {
                "Erro de conexión. Comproba a túa conexión a Internet.".to_string()
            }
            ErrorKind::Timeout => {
                "A conexión está tardando moito tempo. Por favor, inténteo de novo.".to_string()
            }
            ErrorKind::Configuration => {
                "Erro de configuración: faltan variables de conexión co servidor.".to_string()
            }
            ErrorKind::Degraded => {
                "Non hai conexión coa base de datos. Por favor, verifica a configuración."
                    .to_string()
            }
            ErrorKind::PolicyViolation => {
                "Operación non permitida polas políticas de seguridade.".to_string()
            }
            ErrorKind::NoRows | ErrorKind::Backend => {
                format!("Erro ao comunicar co servidor: {}", self.message)
            }
        }
    }
}

impl From<ClientError> for AuthError {
    fn from(err: ClientError) -> Self {
        Self {
            kind: err.kind,
            message: err.message,
        }
    }
}
