//! Polling wait utilities.
//!
//! UI transitions in the application (CSS animation completion, toolbar
//! auto-hide, remote mute propagation) are not observable as discrete
//! events from outside the page. The only robust synchronization strategy
//! for an external observer is to poll the DOM on a short fixed interval
//! with a bounded timeout, and that is all this module does.
//!
//! Waits return as soon as the condition first holds (the very first check
//! included) and fail no earlier than the timeout and no later than the
//! timeout plus one polling interval.

use crate::driver::SessionDriver;
use crate::fixture::Session;
use crate::result::{ReunirError, ReunirResult};
use std::time::{Duration, Instant};

/// Fixed polling interval between DOM checks
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Default bound for UI-transition waits, matching the filmstrip and mute
/// propagation windows of the application under test
pub const DEFAULT_UI_TIMEOUT: Duration = Duration::from_secs(5);

/// Wait until the element's displayed state equals `expected`.
///
/// An element missing from the DOM counts as not displayed, so this can
/// wait for both appearance and disappearance.
///
/// # Errors
///
/// [`ReunirError::WaitTimeout`] carrying the selector and the state seen
/// on the final poll.
pub async fn wait_until_displayed<D: SessionDriver>(
    session: &Session<D>,
    selector: &str,
    expected: bool,
    timeout: Duration,
) -> ReunirResult<()> {
    let start = Instant::now();
    loop {
        let displayed = session.driver().is_displayed(selector).await?;
        if displayed == expected {
            tracing::debug!(
                role = %session.role(),
                selector,
                expected,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "wait satisfied"
            );
            return Ok(());
        }
        if start.elapsed() >= timeout {
            return Err(ReunirError::WaitTimeout {
                selector: selector.to_string(),
                timeout_ms: timeout.as_millis() as u64,
                last_displayed: displayed,
            });
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Wait until no element matches `selector`.
///
/// # Errors
///
/// [`ReunirError::WaitTimeout`] if the element is still present at the
/// bound.
pub async fn wait_until_absent<D: SessionDriver>(
    session: &Session<D>,
    selector: &str,
    timeout: Duration,
) -> ReunirResult<()> {
    let start = Instant::now();
    loop {
        let present = session.driver().is_present(selector).await?;
        if !present {
            tracing::debug!(
                role = %session.role(),
                selector,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "element gone"
            );
            return Ok(());
        }
        if start.elapsed() >= timeout {
            // The element is still present; report whether it was also
            // visible, since a lingering hidden element is a different
            // failure than one stuck on screen.
            let last_displayed = session.driver().is_displayed(selector).await?;
            return Err(ReunirError::WaitTimeout {
                selector: selector.to_string(),
                timeout_ms: timeout.as_millis() as u64,
                last_displayed,
            });
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MeetingConfig, UrlOverrides};
    use crate::fixture::{ConferenceFixture, Role};
    use crate::mock::MockConference;
    use crate::selectors;

    const ONE_ON_ONE: &str = "config.disable1On1Mode";

    async fn one_on_one_owner(
        conference: &MockConference,
    ) -> ConferenceFixture<MockConference> {
        let mut fixture = ConferenceFixture::new(
            MeetingConfig::new("https://meet.example", "wait-room"),
            conference.clone(),
        );
        let overrides = UrlOverrides::new()
            .with(ONE_ON_ONE, "false")
            .with("interfaceConfig.INITIAL_TOOLBAR_TIMEOUT", "100")
            .with("interfaceConfig.TOOLBAR_TIMEOUT", "100")
            .with("config.alwaysVisibleToolbar", "false");
        fixture.start(Role::Owner, &overrides).await.unwrap();
        let session = fixture.session(Role::Owner).unwrap();
        session
            .driver()
            .execute_js("APP.UI.dockToolbar(false);")
            .await
            .unwrap();
        fixture
    }

    #[tokio::test]
    async fn test_wait_returns_immediately_when_condition_already_true() {
        let conference = MockConference::new();
        let fixture = one_on_one_owner(&conference).await;
        let session = fixture.session(Role::Owner).unwrap();

        let start = Instant::now();
        wait_until_displayed(
            session,
            selectors::LOCAL_VIDEO_CONTAINER,
            true,
            Duration::from_secs(5),
        )
        .await
        .unwrap();
        assert!(start.elapsed() < POLL_INTERVAL);
    }

    #[tokio::test]
    async fn test_wait_observes_condition_becoming_true() {
        let conference = MockConference::new();
        let fixture = one_on_one_owner(&conference).await;

        // A second and third participant join shortly; the filmstrip must
        // become displayed for the owner once the meeting exceeds two.
        let late_joiners = conference.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            late_joiners.join(Role::SecondParticipant, &UrlOverrides::new().with(ONE_ON_ONE, "false"));
            late_joiners.join(Role::ThirdParticipant, &UrlOverrides::new().with(ONE_ON_ONE, "false"));
        });

        let session = fixture.session(Role::Owner).unwrap();
        wait_until_displayed(
            session,
            selectors::FILMSTRIP_REMOTE_VIDEOS,
            true,
            Duration::from_secs(2),
        )
        .await
        .unwrap();
        assert_eq!(conference.participant_count(), 3);
    }

    #[tokio::test]
    async fn test_impossible_condition_times_out_within_bounds() {
        let conference = MockConference::new();
        let fixture = one_on_one_owner(&conference).await;
        let session = fixture.session(Role::Owner).unwrap();

        let timeout = Duration::from_millis(300);
        let start = Instant::now();
        let err = wait_until_displayed(
            session,
            selectors::LOCAL_VIDEO_CONTAINER,
            false,
            timeout,
        )
        .await
        .unwrap_err();
        let elapsed = start.elapsed();

        assert!(elapsed >= timeout, "failed before the bound: {elapsed:?}");
        assert!(
            elapsed < timeout + POLL_INTERVAL + Duration::from_millis(100),
            "failed too long after the bound: {elapsed:?}"
        );
        match err {
            ReunirError::WaitTimeout {
                selector,
                timeout_ms,
                last_displayed,
            } => {
                assert_eq!(selector, selectors::LOCAL_VIDEO_CONTAINER);
                assert_eq!(timeout_ms, 300);
                assert!(last_displayed);
            }
            other => panic!("expected WaitTimeout, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_wait_until_absent_observes_toolbar_hide() {
        let conference = MockConference::new();
        let fixture = one_on_one_owner(&conference).await;
        let session = fixture.session(Role::Owner).unwrap();

        wait_until_absent(session, selectors::VISIBLE_TOOLBAR, Duration::from_secs(1))
            .await
            .unwrap();
        // Once hidden it stays hidden without interaction.
        assert!(!session
            .driver()
            .is_present(selectors::VISIBLE_TOOLBAR)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_wait_until_absent_times_out_when_element_persists() {
        let conference = MockConference::new();
        let fixture = one_on_one_owner(&conference).await;
        let session = fixture.session(Role::Owner).unwrap();

        let err = wait_until_absent(
            session,
            selectors::LOCAL_VIDEO_CONTAINER,
            Duration::from_millis(250),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            ReunirError::WaitTimeout {
                last_displayed: true,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_absent_timeout_reports_hidden_element_as_not_displayed() {
        let conference = MockConference::new();
        let fixture = one_on_one_owner(&conference).await;
        let session = fixture.session(Role::Owner).unwrap();

        // Once the toolbar hides, the lone owner's filmstrip container is
        // still in the DOM but no longer visible.
        wait_until_absent(session, selectors::VISIBLE_TOOLBAR, Duration::from_secs(1))
            .await
            .unwrap();
        let err = wait_until_absent(
            session,
            selectors::FILMSTRIP_REMOTE_VIDEOS,
            Duration::from_millis(250),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            ReunirError::WaitTimeout {
                last_displayed: false,
                ..
            }
        ));
    }
}
