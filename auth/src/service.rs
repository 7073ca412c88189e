//! The three guarded flows: registration, sign-in, sign-out.
//!
//! Within one flow every sub-step is awaited to completion (or the budget)
//! before the next begins; there is no fan-out. Across flows nothing here
//! enforces mutual exclusion - the front-end is responsible for disabling
//! re-entrant triggers.

use std::sync::Arc;

use kampos_client::{ClientManager, NewUser};
use kampos_types::{DEFAULT_ROLE, Session, UserProfile};

use crate::error::AuthError;
use crate::guard::{GuardBudgets, OpKind, guarded};

pub struct AuthService {
    manager: Arc<ClientManager>,
    budgets: GuardBudgets,
}

/// Terminal state of a registration.
///
/// `session` is `None` for "account created, must sign in manually":
/// the identity exists but the best-effort automatic sign-in failed.
#[derive(Debug)]
pub struct RegisterOutcome {
    pub profile: UserProfile,
    pub session: Option<Session>,
    /// Whether the mirrored `profiles` write landed. `false` is degraded
    /// but non-fatal; sign-in synthesizes the row later.
    pub profile_mirrored: bool,
}

impl AuthService {
    #[must_use]
    pub fn new(manager: Arc<ClientManager>) -> Self {
        Self::with_budgets(manager, GuardBudgets::default())
    }

    #[must_use]
    pub fn with_budgets(manager: Arc<ClientManager>, budgets: GuardBudgets) -> Self {
        Self { manager, budgets }
    }

    #[must_use]
    pub fn manager(&self) -> &Arc<ClientManager> {
        &self.manager
    }

    /// Create an identity, mirror its profile, and sign the user in.
    ///
    /// Only step 1 (identity creation) can fail the flow; the mirrored
    /// write and the automatic sign-in are best-effort.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<RegisterOutcome, AuthError> {
        let manager = Arc::clone(&self.manager);
        let email = email.to_string();
        let password = password.to_string();
        let full_name = full_name.to_string();

        guarded(OpKind::SignUp, self.budgets.for_op(OpKind::SignUp), async move {
            register_flow(&manager, &email, &password, &full_name).await
        })
        .await
    }

    /// Authenticate and return the mirrored profile, synthesizing one from
    /// identity metadata when the row is absent.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserProfile, AuthError> {
        let manager = Arc::clone(&self.manager);
        let email = email.to_string();
        let password = password.to_string();

        guarded(OpKind::SignIn, self.budgets.for_op(OpKind::SignIn), async move {
            sign_in_flow(&manager, &email, &password).await
        })
        .await
    }

    /// Terminate the session.
    ///
    /// No-op success when none is persisted. Whatever the backend says (or
    /// fails to say inside the budget), the session-scoped keys are cleared
    /// before returning, so the client-observable signed-out state is
    /// always reached; backend rejection and timeout still propagate so the
    /// front-end can report them.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let Some(session) = self.manager.session() else {
            tracing::debug!("No active session to close");
            return Ok(());
        };

        let manager = Arc::clone(&self.manager);
        let result = guarded(
            OpKind::SignOut,
            self.budgets.for_op(OpKind::SignOut),
            async move {
                let client = manager.client();
                client
                    .sign_out(&session.access_token)
                    .await
                    .map_err(AuthError::from)
            },
        )
        .await;

        self.manager.clear_session();

        if let Err(err) = &result {
            tracing::warn!(
                kind = %err.kind,
                "Backend sign-out did not complete; local session cleared anyway"
            );
        }
        result
    }

    /// The profile of the currently signed-in user, `None` when no session
    /// is persisted or the lookup failed outright.
    pub async fn current_user(&self) -> Option<UserProfile> {
        let session = self.manager.session()?;
        let client = self.manager.client();

        match client
            .select_profile(session.user.id, Some(&session.access_token))
            .await
        {
            Ok(profile) => Some(profile),
            Err(err) if err.kind.is_missing_profile() => {
                Some(UserProfile::from_identity(&session.user))
            }
            Err(err) => {
                tracing::error!(kind = %err.kind, "Failed to load current user profile");
                None
            }
        }
    }
}

async fn register_flow(
    manager: &ClientManager,
    email: &str,
    password: &str,
    full_name: &str,
) -> Result<RegisterOutcome, AuthError> {
    // Step 1: the identity. This is the only step allowed to fail the flow.
    let privileged = manager.privileged_client()?;
    let user = privileged
        .create_user(&NewUser::new(email, password, full_name))
        .await?;
    tracing::info!(user = %user.id, "Identity created");

    let profile = UserProfile {
        id: user.id,
        email: email.to_string(),
        full_name: Some(full_name.to_string()),
        role: DEFAULT_ROLE.to_string(),
        created_at: None,
        updated_at: None,
    };

    // Step 2: best-effort mirror. The identity already exists, so a failed
    // write here must not fail the registration.
    let profile_mirrored = match privileged.insert_profile(&profile, None).await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(kind = %err.kind, "Mirrored profile write failed");
            false
        }
    };

    // Step 3: best-effort automatic sign-in with the just-created
    // credentials.
    let session = match manager
        .client()
        .sign_in_with_password(email, password)
        .await
    {
        Ok(session) => {
            manager.persist_session(&session);
            Some(session)
        }
        Err(err) => {
            tracing::warn!(
                kind = %err.kind,
                "Automatic sign-in after registration failed; manual sign-in required"
            );
            None
        }
    };

    Ok(RegisterOutcome {
        profile,
        session,
        profile_mirrored,
    })
}

async fn sign_in_flow(
    manager: &ClientManager,
    email: &str,
    password: &str,
) -> Result<UserProfile, AuthError> {
    let client = manager.client();
    let session = client.sign_in_with_password(email, password).await?;
    manager.persist_session(&session);

    match client
        .select_profile(session.user.id, Some(&session.access_token))
        .await
    {
        Ok(profile) => Ok(profile),
        Err(err) => {
            if err.kind.is_missing_profile() {
                tracing::debug!("No mirrored profile yet; synthesizing one");
            } else {
                tracing::error!(kind = %err.kind, "Failed to read mirrored profile");
            }

            let synthesized = UserProfile::from_identity(&session.user);
            if let Err(write_err) = client
                .upsert_profile(&synthesized, Some(&session.access_token))
                .await
            {
                tracing::warn!(kind = %write_err.kind, "Mirrored profile write-back failed");
            }
            Ok(synthesized)
        }
    }
}
