//! In-process mock of the conferencing UI.
//!
//! Scenarios run against this model by default, so the whole suite
//! executes without a browser. The mock reproduces the observable DOM
//! behavior the regression tests depend on:
//!
//! - remote filmstrip thumbnails hide in a one-on-one call and reappear
//!   with a third participant, on self-view focus, or on hover;
//! - toolbars auto-hide after the configured timeout unless docked;
//! - the video-quality slider at its minimum bound enables audio-only
//!   mode, which other participants observe as a video mute after a short
//!   propagation delay (exercising the polling waits);
//! - configuration is read from URL overrides at join time only, so a
//!   restart is required for new overrides to take effect.
//!
//! One [`MockConference`] is shared by every [`MockSession`]; it also
//! acts as the [`SessionFactory`] handed to the fixture.

use crate::actions::MuteKind;
use crate::config::UrlOverrides;
use crate::driver::{Key, SessionDriver};
use crate::fixture::{Role, SessionFactory};
use crate::result::{ReunirError, ReunirResult};
use crate::selectors;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Toolbar auto-hide delay when the URL does not override it
const DEFAULT_TOOLBAR_TIMEOUT_MS: u64 = 4000;

/// Delay before a participant's mute state becomes visible to others
const MUTE_PROPAGATION_MS: u64 = 300;

/// Video quality slider bounds; the minimum is audio-only
const SLIDER_MIN: i64 = 0;
const SLIDER_MAX: i64 = 2;

/// DOM elements the mock knows how to render, parsed from a selector.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    FilmstripRemoteVideos,
    LocalVideo,
    VisibleToolbar,
    ToolbarButton(String),
    VideoQualitySlider,
    AudioOnlyLabel,
    DominantSpeakerAvatar,
    LocalThumbnailAvatar,
    MuteIcon { role: Role, kind: MuteKind },
}

impl Target {
    fn parse(selector: &str) -> Option<Self> {
        match selector {
            selectors::FILMSTRIP_REMOTE_VIDEOS => Some(Self::FilmstripRemoteVideos),
            selectors::LOCAL_VIDEO_CONTAINER => Some(Self::LocalVideo),
            selectors::VISIBLE_TOOLBAR => Some(Self::VisibleToolbar),
            selectors::VIDEO_QUALITY_SLIDER => Some(Self::VideoQualitySlider),
            selectors::AUDIO_ONLY_LABEL => Some(Self::AudioOnlyLabel),
            selectors::DOMINANT_SPEAKER_AVATAR => Some(Self::DominantSpeakerAvatar),
            selectors::LOCAL_THUMBNAIL_AVATAR => Some(Self::LocalThumbnailAvatar),
            _ => {
                if let Some(id) = selector.strip_prefix("#toolbar_button_") {
                    return Some(Self::ToolbarButton(format!("toolbar_button_{id}")));
                }
                let rest = selector.strip_prefix("#participant_")?;
                let (resource, suffix) = rest.split_once("_thumbnail .")?;
                let kind = match suffix {
                    "audioMuted" => MuteKind::Audio,
                    "videoMuted" => MuteKind::Video,
                    _ => return None,
                };
                let role = Role::ALL
                    .into_iter()
                    .find(|role| role.resource_id() == resource)?;
                Some(Self::MuteIcon { role, kind })
            }
        }
    }
}

/// Per-participant UI state.
#[derive(Debug)]
struct ParticipantState {
    overrides: UrlOverrides,
    last_interaction: Instant,
    interacted: bool,
    toolbar_docked: bool,
    self_focus: bool,
    hovering_filmstrip: bool,
    audio_muted: bool,
    manual_video_mute: bool,
    audio_only: bool,
    prev_audio_only: bool,
    audio_only_visible_at: Instant,
    dialog_open: bool,
    slider_value: i64,
}

impl ParticipantState {
    fn join(overrides: UrlOverrides) -> Self {
        let now = Instant::now();
        Self {
            overrides,
            last_interaction: now,
            interacted: false,
            // The application docks toolbars until told otherwise via
            // APP.UI.dockToolbar(false).
            toolbar_docked: true,
            self_focus: false,
            hovering_filmstrip: false,
            audio_muted: false,
            manual_video_mute: false,
            audio_only: false,
            prev_audio_only: false,
            audio_only_visible_at: now,
            dialog_open: false,
            slider_value: SLIDER_MAX,
        }
    }

    fn override_ms(&self, key: &str, default_ms: u64) -> Duration {
        let ms = self
            .overrides
            .get(key)
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(default_ms);
        Duration::from_millis(ms)
    }

    fn one_on_one_enabled(&self) -> bool {
        self.overrides.get("config.disable1On1Mode") == Some("false")
    }

    fn toolbar_always_visible(&self) -> bool {
        self.overrides.get("config.alwaysVisibleToolbar") == Some("true")
    }

    fn toolbar_visible(&self, now: Instant) -> bool {
        if self.toolbar_always_visible() || self.toolbar_docked {
            return true;
        }
        let timeout = if self.interacted {
            self.override_ms("interfaceConfig.TOOLBAR_TIMEOUT", DEFAULT_TOOLBAR_TIMEOUT_MS)
        } else {
            self.override_ms(
                "interfaceConfig.INITIAL_TOOLBAR_TIMEOUT",
                DEFAULT_TOOLBAR_TIMEOUT_MS,
            )
        };
        now.duration_since(self.last_interaction) < timeout
    }

    fn touch(&mut self, now: Instant) {
        self.last_interaction = now;
        self.interacted = true;
    }

    fn effective_audio_only(&self, now: Instant) -> bool {
        if now >= self.audio_only_visible_at {
            self.audio_only
        } else {
            self.prev_audio_only
        }
    }

    fn effective_video_muted(&self, now: Instant) -> bool {
        self.manual_video_mute || self.effective_audio_only(now)
    }

    fn set_audio_only_target(&mut self, target: bool, now: Instant) {
        if target == self.audio_only {
            return;
        }
        self.prev_audio_only = self.effective_audio_only(now);
        self.audio_only = target;
        self.audio_only_visible_at = now + Duration::from_millis(MUTE_PROPAGATION_MS);
    }
}

#[derive(Debug, Default)]
struct ConferenceState {
    participants: HashMap<Role, ParticipantState>,
}

impl ConferenceState {
    fn is_present(&self, observer: Role, target: &Target, now: Instant) -> bool {
        let Some(me) = self.participants.get(&observer) else {
            return false;
        };
        match target {
            Target::FilmstripRemoteVideos
            | Target::LocalVideo
            | Target::ToolbarButton(_)
            | Target::DominantSpeakerAvatar
            | Target::LocalThumbnailAvatar => true,
            Target::VisibleToolbar => me.toolbar_visible(now),
            Target::VideoQualitySlider => me.dialog_open,
            Target::AudioOnlyLabel => me.effective_audio_only(now),
            Target::MuteIcon { role, .. } => self.participants.contains_key(role),
        }
    }

    fn is_displayed(&self, observer: Role, target: &Target, now: Instant) -> bool {
        let Some(me) = self.participants.get(&observer) else {
            return false;
        };
        match target {
            Target::FilmstripRemoteVideos => {
                if me.one_on_one_enabled() {
                    self.participants.len() > 2
                        || me.self_focus
                        || me.hovering_filmstrip
                        || me.toolbar_visible(now)
                } else {
                    self.participants.len() >= 2
                }
            }
            Target::LocalVideo => true,
            Target::VisibleToolbar => me.toolbar_visible(now),
            Target::ToolbarButton(_) => me.toolbar_visible(now),
            Target::VideoQualitySlider => me.dialog_open,
            Target::AudioOnlyLabel => me.effective_audio_only(now),
            Target::DominantSpeakerAvatar => self
                .participants
                .values()
                .any(|p| p.effective_video_muted(now)),
            Target::LocalThumbnailAvatar => me.effective_video_muted(now),
            Target::MuteIcon { role, kind } => {
                self.participants.get(role).is_some_and(|p| match kind {
                    MuteKind::Audio => p.audio_muted,
                    MuteKind::Video => p.effective_video_muted(now),
                })
            }
        }
    }
}

/// Shared mock conference state; cheap to clone.
///
/// Also the [`SessionFactory`] used by scenarios that run in-process.
#[derive(Debug, Clone, Default)]
pub struct MockConference {
    state: Arc<Mutex<ConferenceState>>,
}

impl MockConference {
    /// Create an empty conference
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the conference directly, outside any fixture.
    ///
    /// Test scaffolding for simulating participants arriving while a
    /// scenario is waiting on the DOM.
    pub fn join(&self, role: Role, overrides: &UrlOverrides) {
        let mut state = self.state.lock().unwrap();
        let _ = state
            .participants
            .insert(role, ParticipantState::join(overrides.clone()));
        tracing::debug!(%role, "participant joined");
    }

    /// Remove a participant; no-op when absent
    pub fn leave(&self, role: Role) {
        let mut state = self.state.lock().unwrap();
        if state.participants.remove(&role).is_some() {
            tracing::debug!(%role, "participant left");
        }
    }

    /// Number of joined participants
    #[must_use]
    pub fn participant_count(&self) -> usize {
        self.state.lock().unwrap().participants.len()
    }

    /// Whether the role is currently joined
    #[must_use]
    pub fn contains(&self, role: Role) -> bool {
        self.state.lock().unwrap().participants.contains_key(&role)
    }

    /// The overrides a participant joined with
    #[must_use]
    pub fn overrides_for(&self, role: Role) -> Option<UrlOverrides> {
        self.state
            .lock()
            .unwrap()
            .participants
            .get(&role)
            .map(|p| p.overrides.clone())
    }
}

#[async_trait]
impl SessionFactory for MockConference {
    type Driver = MockSession;

    async fn launch(&self, role: Role) -> ReunirResult<MockSession> {
        Ok(MockSession {
            conference: self.clone(),
            role,
            url: String::new(),
            open: true,
        })
    }
}

/// One participant's simulated browser session.
#[derive(Debug)]
pub struct MockSession {
    conference: MockConference,
    role: Role,
    url: String,
    open: bool,
}

impl MockSession {
    fn ensure_open(&self) -> ReunirResult<()> {
        if self.open {
            Ok(())
        } else {
            Err(ReunirError::Driver {
                message: format!("session for {} is closed", self.role),
            })
        }
    }

    fn parse_target(&self, selector: &str) -> ReunirResult<Target> {
        Target::parse(selector).ok_or_else(|| ReunirError::ElementNotFound {
            selector: selector.to_string(),
        })
    }

    /// Run `f` over the participant state for this session's role.
    fn with_me<T>(
        &self,
        f: impl FnOnce(&mut ParticipantState, Instant) -> T,
    ) -> ReunirResult<T> {
        let mut state = self.conference.state.lock().unwrap();
        let me = state
            .participants
            .get_mut(&self.role)
            .ok_or_else(|| ReunirError::Driver {
                message: format!("{} has not joined the meeting", self.role),
            })?;
        Ok(f(me, Instant::now()))
    }
}

#[async_trait]
impl SessionDriver for MockSession {
    async fn navigate(&mut self, url: &str) -> ReunirResult<()> {
        self.ensure_open()?;
        if url.is_empty() {
            return Err(ReunirError::Driver {
                message: "empty meeting url".to_string(),
            });
        }
        let overrides = url
            .split_once('#')
            .map_or_else(UrlOverrides::new, |(_, fragment)| {
                UrlOverrides::parse_fragment(fragment)
            });
        self.conference.join(self.role, &overrides);
        self.url = url.to_string();
        Ok(())
    }

    async fn click(&self, selector: &str) -> ReunirResult<()> {
        self.ensure_open()?;
        let target = self.parse_target(selector)?;
        {
            let state = self.conference.state.lock().unwrap();
            if !state.is_present(self.role, &target, Instant::now()) {
                return Err(ReunirError::ElementNotFound {
                    selector: selector.to_string(),
                });
            }
        }
        tracing::debug!(role = %self.role, selector, "click");
        self.with_me(|me, now| {
            me.touch(now);
            match &target {
                Target::LocalVideo => me.self_focus = !me.self_focus,
                Target::ToolbarButton(id) => match id.as_str() {
                    selectors::CAMERA_BUTTON => {
                        // Video unmute is rejected while audio-only is on.
                        if !me.audio_only {
                            me.manual_video_mute = !me.manual_video_mute;
                        }
                    }
                    selectors::MICROPHONE_BUTTON => me.audio_muted = !me.audio_muted,
                    selectors::VIDEO_QUALITY_BUTTON => me.dialog_open = !me.dialog_open,
                    _ => {}
                },
                _ => {}
            }
        })
    }

    async fn hover(&self, selector: &str) -> ReunirResult<()> {
        self.ensure_open()?;
        let target = self.parse_target(selector)?;
        self.with_me(|me, _now| {
            if matches!(target, Target::LocalVideo | Target::FilmstripRemoteVideos) {
                me.hovering_filmstrip = true;
            }
        })
    }

    async fn press_key(&self, selector: &str, key: Key) -> ReunirResult<()> {
        self.ensure_open()?;
        let target = self.parse_target(selector)?;
        if target != Target::VideoQualitySlider {
            return Ok(());
        }
        self.with_me(|me, now| {
            if !me.dialog_open {
                return Err(ReunirError::ElementNotFound {
                    selector: selector.to_string(),
                });
            }
            me.slider_value = match key {
                Key::ArrowLeft => (me.slider_value - 1).max(SLIDER_MIN),
                Key::ArrowRight => (me.slider_value + 1).min(SLIDER_MAX),
            };
            me.set_audio_only_target(me.slider_value == SLIDER_MIN, now);
            Ok(())
        })?
    }

    async fn attribute(&self, selector: &str, name: &str) -> ReunirResult<Option<String>> {
        self.ensure_open()?;
        let target = self.parse_target(selector)?;
        self.with_me(|me, _now| {
            let state_present = match &target {
                Target::VideoQualitySlider => me.dialog_open,
                _ => true,
            };
            if !state_present {
                return Err(ReunirError::ElementNotFound {
                    selector: selector.to_string(),
                });
            }
            let value = match (&target, name) {
                (Target::VideoQualitySlider, "min") => Some(SLIDER_MIN.to_string()),
                (Target::VideoQualitySlider, "max") => Some(SLIDER_MAX.to_string()),
                (Target::VideoQualitySlider, "value") => Some(me.slider_value.to_string()),
                _ => None,
            };
            Ok(value)
        })?
    }

    async fn execute_js(&self, script: &str) -> ReunirResult<serde_json::Value> {
        self.ensure_open()?;
        match script.trim() {
            "APP.UI.dockToolbar(false);" => {
                self.with_me(|me, _| me.toolbar_docked = false)?;
            }
            "APP.UI.dockToolbar(true);" => {
                self.with_me(|me, _| me.toolbar_docked = true)?;
            }
            _ => {}
        }
        Ok(serde_json::Value::Null)
    }

    async fn is_present(&self, selector: &str) -> ReunirResult<bool> {
        self.ensure_open()?;
        let Some(target) = Target::parse(selector) else {
            return Ok(false);
        };
        let state = self.conference.state.lock().unwrap();
        Ok(state.is_present(self.role, &target, Instant::now()))
    }

    async fn is_displayed(&self, selector: &str) -> ReunirResult<bool> {
        self.ensure_open()?;
        let Some(target) = Target::parse(selector) else {
            return Ok(false);
        };
        let state = self.conference.state.lock().unwrap();
        Ok(state.is_displayed(self.role, &target, Instant::now()))
    }

    async fn current_url(&self) -> ReunirResult<String> {
        Ok(self.url.clone())
    }

    async fn close(&mut self) -> ReunirResult<()> {
        if self.open {
            self.conference.leave(self.role);
            self.open = false;
        }
        Ok(())
    }
}
