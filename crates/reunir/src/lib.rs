//! Reunir: UI Regression Harness for Web Conferences
//!
//! Reunir (Spanish: "to gather/meet") drives multi-participant meeting
//! sessions and asserts on the conference UI: filmstrip visibility in
//! one-on-one calls, toolbar auto-hide timing, audio-only mode and mute
//! icon propagation.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     REUNIR Architecture                          │
//! ├──────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌─────────────┐    ┌──────────────┐          │
//! │   │ Scenario   │    │ Conference  │    │ SessionDriver│          │
//! │   │ (Rust)     │───►│ Fixture     │───►│ mock / CDP   │          │
//! │   │            │    │ (per role)  │    │ (chromium)   │          │
//! │   └────────────┘    └─────────────┘    └──────────────┘          │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Scenarios run against the in-process [`mock::MockConference`] by
//! default; the `browser` feature adds a chromium-backed driver for the
//! same scenarios against a live deployment.

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

/// UI action helpers: toolbar clicks, slider movement, mute icons
pub mod actions;
/// Meeting URLs and hash-fragment configuration overrides
pub mod config;
/// Driver abstraction over a participant's browser session
pub mod driver;
/// Multi-participant conference fixture and roles
pub mod fixture;
/// In-process conference simulation used by the default test runs
pub mod mock;
/// Error and result types
pub mod result;
/// CSS selectors for the conference UI
pub mod selectors;
/// Polling waits over element visibility
pub mod wait;

pub use actions::{
    click_local_video, click_toolbar_button, hover, hover_local_video, mute_icon_displayed,
    set_toolbar_docked, slide_to_bound, MuteKind, SliderBound,
};
pub use config::{MeetingConfig, UrlOverrides, DEFAULT_ROOM, MEETING_URL_ENV};
pub use driver::{BrowserLaunchConfig, Key, SessionDriver};
#[cfg(feature = "browser")]
pub use driver::{CdpDriver, CdpFactory};
pub use fixture::{ConferenceFixture, Role, Session, SessionFactory};
pub use mock::{MockConference, MockSession};
pub use result::{ReunirError, ReunirResult};
pub use wait::{
    wait_until_absent, wait_until_displayed, DEFAULT_UI_TIMEOUT, POLL_INTERVAL,
};
