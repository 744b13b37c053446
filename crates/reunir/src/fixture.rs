//! Conference fixture: named browser sessions and their configuration.
//!
//! The fixture is the single owner of every participant session. Scenarios
//! borrow session handles, never own them, and an explicit `close_all`
//! (or dropping the fixture at suite end) tears everything down.
//!
//! The one invariant that matters: at most one live session per role.
//! Because URL-parameter overrides only apply at page load, `start` on an
//! active role closes the previous session and *awaits* that closure
//! before launching the replacement, so the new configuration is
//! guaranteed to take effect.

use crate::config::{MeetingConfig, UrlOverrides};
use crate::driver::SessionDriver;
use crate::result::{ReunirError, ReunirResult};
use async_trait::async_trait;
use std::collections::HashMap;

/// A participant role in the meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Meeting owner, the first participant to join
    Owner,
    /// Second participant
    SecondParticipant,
    /// Third participant
    ThirdParticipant,
}

impl Role {
    /// All roles, in join order
    pub const ALL: [Self; 3] = [Self::Owner, Self::SecondParticipant, Self::ThirdParticipant];

    /// Human-readable name used in failure messages
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::SecondParticipant => "second participant",
            Self::ThirdParticipant => "third participant",
        }
    }

    /// Stable id the application uses for this participant's thumbnail
    #[must_use]
    pub const fn resource_id(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::SecondParticipant => "participant2",
            Self::ThirdParticipant => "participant3",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// How the fixture obtains a fresh driver for a role.
///
/// Implemented by [`crate::mock::MockConference`] and, with the `browser`
/// feature, by [`crate::driver::CdpFactory`].
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Driver type produced by this factory
    type Driver: SessionDriver;

    /// Launch a new, not-yet-navigated driver for `role`
    async fn launch(&self, role: Role) -> ReunirResult<Self::Driver>;
}

/// One live browser session bound to a role.
#[derive(Debug)]
pub struct Session<D> {
    role: Role,
    driver: D,
    url: String,
}

impl<D: SessionDriver> Session<D> {
    /// The role this session represents
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// The URL the session last navigated to, overrides included
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Driver handle for issuing actions
    #[must_use]
    pub const fn driver(&self) -> &D {
        &self.driver
    }
}

/// Fixture owning the set of named participant sessions.
pub struct ConferenceFixture<F: SessionFactory> {
    config: MeetingConfig,
    factory: F,
    sessions: HashMap<Role, Session<F::Driver>>,
}

impl<F: SessionFactory> std::fmt::Debug for ConferenceFixture<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConferenceFixture")
            .field("config", &self.config)
            .field("active_sessions", &self.sessions.len())
            .finish()
    }
}

impl<F: SessionFactory> ConferenceFixture<F> {
    /// Create a fixture for the given meeting
    #[must_use]
    pub fn new(config: MeetingConfig, factory: F) -> Self {
        Self {
            config,
            factory,
            sessions: HashMap::new(),
        }
    }

    /// Meeting configuration in use
    #[must_use]
    pub const fn config(&self) -> &MeetingConfig {
        &self.config
    }

    /// Roles with a currently-live session, in join order
    #[must_use]
    pub fn active_roles(&self) -> Vec<Role> {
        Role::ALL
            .into_iter()
            .filter(|role| self.sessions.contains_key(role))
            .collect()
    }

    /// Start (or restart) the session for `role` with the given overrides.
    ///
    /// Any live session for the role is closed first, and the closure is
    /// awaited before the replacement launches.
    ///
    /// # Errors
    ///
    /// Returns [`ReunirError::SessionStart`] when launch or navigation
    /// fails. Callers are expected to fail the scenario, not retry.
    pub async fn start(
        &mut self,
        role: Role,
        overrides: &UrlOverrides,
    ) -> ReunirResult<&Session<F::Driver>> {
        if let Some(mut old) = self.sessions.remove(&role) {
            tracing::info!(%role, "closing previous session before restart");
            old.driver.close().await?;
        }

        let url = self.config.meeting_url(overrides);
        tracing::info!(%role, url, "starting session");

        let mut driver =
            self.factory
                .launch(role)
                .await
                .map_err(|e| ReunirError::SessionStart {
                    role,
                    url: url.clone(),
                    message: e.to_string(),
                })?;

        driver
            .navigate(&url)
            .await
            .map_err(|e| ReunirError::SessionStart {
                role,
                url: url.clone(),
                message: e.to_string(),
            })?;

        let session = Session { role, driver, url };
        Ok(self.sessions.entry(role).or_insert(session))
    }

    /// Get the active session for `role`.
    ///
    /// # Errors
    ///
    /// Returns [`ReunirError::SessionNotFound`] if no session has been
    /// started for the role (or it has been closed).
    pub fn session(&self, role: Role) -> ReunirResult<&Session<F::Driver>> {
        self.sessions
            .get(&role)
            .ok_or(ReunirError::SessionNotFound { role })
    }

    /// Close the session for `role`. A no-op when none is active.
    pub async fn close(&mut self, role: Role) -> ReunirResult<()> {
        if let Some(mut session) = self.sessions.remove(&role) {
            tracing::info!(%role, "closing session");
            session.driver.close().await?;
        }
        Ok(())
    }

    /// Close every active session and restart each with `overrides`.
    ///
    /// Used to reset state between independent scenario groups. Close
    /// failures are logged and skipped so one wedged session cannot stop
    /// the rest from restarting.
    pub async fn restart_all(&mut self, overrides: &UrlOverrides) -> ReunirResult<()> {
        let roles = self.active_roles();

        for role in &roles {
            if let Some(mut session) = self.sessions.remove(role) {
                if let Err(e) = session.driver.close().await {
                    tracing::warn!(%role, error = %e, "close failed during restart; continuing");
                }
            }
        }

        for role in roles {
            self.start(role, overrides).await?;
        }
        Ok(())
    }

    /// Tear down every session; idempotent.
    pub async fn close_all(&mut self) -> ReunirResult<()> {
        for role in self.active_roles() {
            self.close(role).await?;
        }
        Ok(())
    }
}
