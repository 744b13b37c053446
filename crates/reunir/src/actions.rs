//! UI action helpers shared by the regression scenarios.
//!
//! Each helper drives a single interaction through a [`Session`]'s
//! driver: clicking toolbar buttons, toggling self-view focus, moving
//! the video-quality slider with the keyboard, and reading mute icons
//! from another participant's thumbnail.

use crate::driver::{Key, SessionDriver};
use crate::fixture::{Role, Session};
use crate::result::{ReunirError, ReunirResult};
use crate::selectors;

/// Which mute indicator to read from a participant thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MuteKind {
    /// Microphone mute icon
    Audio,
    /// Camera mute icon
    Video,
}

/// Which end of the video-quality slider to move to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderBound {
    /// Lowest quality; the application switches to audio-only here
    Minimum,
    /// Highest quality
    Maximum,
}

/// Click a toolbar button by its element id (without the `#` prefix).
pub async fn click_toolbar_button<D: SessionDriver>(
    session: &Session<D>,
    button_id: &str,
) -> ReunirResult<()> {
    tracing::debug!(role = %session.role(), button_id, "clicking toolbar button");
    session.driver().click(&selectors::toolbar_button(button_id)).await
}

/// Click the local thumbnail, toggling self-view focus.
pub async fn click_local_video<D: SessionDriver>(session: &Session<D>) -> ReunirResult<()> {
    session.driver().click(selectors::LOCAL_VIDEO_CONTAINER).await
}

/// Move the pointer over the element matching `selector` and hold,
/// without clicking, to trigger hover-only UI reveals.
pub async fn hover<D: SessionDriver>(session: &Session<D>, selector: &str) -> ReunirResult<()> {
    tracing::debug!(role = %session.role(), selector, "hovering");
    session.driver().hover(selector).await
}

/// Move the pointer over the local thumbnail.
pub async fn hover_local_video<D: SessionDriver>(session: &Session<D>) -> ReunirResult<()> {
    hover(session, selectors::LOCAL_VIDEO_CONTAINER).await
}

/// Whether `observed` currently shows a mute icon of the given kind,
/// as seen from `session`.
pub async fn mute_icon_displayed<D: SessionDriver>(
    session: &Session<D>,
    observed: Role,
    kind: MuteKind,
) -> ReunirResult<bool> {
    let selector = match kind {
        MuteKind::Audio => selectors::audio_mute_icon(observed),
        MuteKind::Video => selectors::video_mute_icon(observed),
    };
    session.driver().is_displayed(&selector).await
}

/// Drive the video-quality slider to one of its bounds with arrow keys.
///
/// Reads the slider's `min`, `max` and `value` attributes to compute how
/// many presses are needed, mirroring how a user would hold the key.
pub async fn slide_to_bound<D: SessionDriver>(
    session: &Session<D>,
    bound: SliderBound,
) -> ReunirResult<()> {
    let driver = session.driver();
    let min = slider_attribute(driver, "min").await?;
    let max = slider_attribute(driver, "max").await?;
    let value = slider_attribute(driver, "value").await?;

    let (steps, key) = match bound {
        SliderBound::Minimum => (value.saturating_sub(min), Key::ArrowLeft),
        SliderBound::Maximum => (max.saturating_sub(value), Key::ArrowRight),
    };
    tracing::debug!(role = %session.role(), ?bound, steps, "moving video quality slider");
    for _ in 0..steps {
        driver.press_key(selectors::VIDEO_QUALITY_SLIDER, key).await?;
    }
    Ok(())
}

async fn slider_attribute<D: SessionDriver>(driver: &D, name: &str) -> ReunirResult<i64> {
    let raw = driver
        .attribute(selectors::VIDEO_QUALITY_SLIDER, name)
        .await?
        .ok_or_else(|| ReunirError::Driver {
            message: format!("video quality slider has no `{name}` attribute"),
        })?;
    raw.parse().map_err(|_| ReunirError::Driver {
        message: format!("video quality slider `{name}` is not a number: {raw}"),
    })
}

/// Dock or undock the toolbar so it stops (or resumes) auto-hiding.
pub async fn set_toolbar_docked<D: SessionDriver>(
    session: &Session<D>,
    docked: bool,
) -> ReunirResult<()> {
    session
        .driver()
        .execute_js(&format!("APP.UI.dockToolbar({docked});"))
        .await?;
    Ok(())
}
