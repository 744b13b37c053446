//! DOM selectors for the conferencing application under test.
//!
//! These identifiers must match the application's markup. They are test
//! fixtures, not a compatibility surface; no guarantee is made across
//! application versions.

use crate::fixture::Role;

/// Container holding remote participant video thumbnails
pub const FILMSTRIP_REMOTE_VIDEOS: &str = "#filmstripRemoteVideosContainer";

/// The local self-view thumbnail
pub const LOCAL_VIDEO_CONTAINER: &str = "#localVideoContainer";

/// A toolbar that is currently sliding in / visible
pub const VISIBLE_TOOLBAR: &str = ".toolbar_secondary.slideInExtX";

/// Camera (video mute) toolbar button id
pub const CAMERA_BUTTON: &str = "toolbar_button_camera";

/// Microphone (audio mute) toolbar button id
pub const MICROPHONE_BUTTON: &str = "toolbar_button_mute";

/// Video quality dialog toolbar button id
pub const VIDEO_QUALITY_BUTTON: &str = "toolbar_button_videoquality";

/// Slider inside the video quality dialog
pub const VIDEO_QUALITY_SLIDER: &str = ".video-quality-dialog-slider";

/// Label icon shown while audio-only mode is active
pub const AUDIO_ONLY_LABEL: &str = "#videoResolutionLabel .icon-visibility-off";

/// Avatar shown on the large video when the speaker is video muted
pub const DOMINANT_SPEAKER_AVATAR: &str = "#dominantSpeaker";

/// Avatar shown inside the local self-view thumbnail
pub const LOCAL_THUMBNAIL_AVATAR: &str = "#localVideoContainer .userAvatar";

/// Selector for a toolbar button by its stable id
#[must_use]
pub fn toolbar_button(button_id: &str) -> String {
    format!("#{button_id}")
}

/// Audio mute indicator on a participant's thumbnail
#[must_use]
pub fn audio_mute_icon(role: Role) -> String {
    format!("#participant_{}_thumbnail .audioMuted", role.resource_id())
}

/// Video mute indicator on a participant's thumbnail
#[must_use]
pub fn video_mute_icon(role: Role) -> String {
    format!("#participant_{}_thumbnail .videoMuted", role.resource_id())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toolbar_button_selector() {
        assert_eq!(toolbar_button(CAMERA_BUTTON), "#toolbar_button_camera");
    }

    #[test]
    fn test_mute_icon_selectors_encode_role() {
        assert_eq!(
            video_mute_icon(Role::Owner),
            "#participant_owner_thumbnail .videoMuted"
        );
        assert_eq!(
            audio_mute_icon(Role::SecondParticipant),
            "#participant_participant2_thumbnail .audioMuted"
        );
    }
}
