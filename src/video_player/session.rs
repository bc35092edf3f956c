// SPDX-License-Identifier: MPL-2.0
//! One loaded playback instance and the handles it owns.

use super::acquire::{CancelHandle, EngineSlot};
use super::handles::{DubbedAudio, SubtitleTrack, VideoHandle};
use crate::application::port::{HandleId, VideoEngine};
use crate::domain::media::{AudioSelection, LanguageCode, MediaItem};
use crate::domain::video::{SessionId, SessionState};

/// Auxiliary tracks that failed after the session became ready.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Degradation {
    /// Language and message of the dubbed track that failed, if any.
    pub audio: Option<(LanguageCode, String)>,
    /// Language and message of the subtitle track that failed, if any.
    pub subtitles: Option<(LanguageCode, String)>,
}

impl Degradation {
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.audio.is_some() || self.subtitles.is_some()
    }
}

/// Pairing of a media item with a language selection and the engine
/// resources that realise it.
///
/// Handles are private: nothing outside the session holds a live engine or
/// element. Dropping the session releases whatever it still owns.
#[derive(Debug)]
pub struct PlaybackSession {
    id: SessionId,
    item: MediaItem,
    subtitle_language: Option<LanguageCode>,
    audio_language: AudioSelection,
    state: SessionState,
    pub(super) video: Option<VideoHandle>,
    pub(super) audio: Option<DubbedAudio>,
    pub(super) subtitle: Option<SubtitleTrack>,
    pub(super) cancel: Option<CancelHandle>,
    pub(super) slot: Option<EngineSlot>,
    degradation: Degradation,
}

impl PlaybackSession {
    pub(super) fn new(
        id: SessionId,
        item: MediaItem,
        subtitle_language: LanguageCode,
        audio_language: AudioSelection,
    ) -> Self {
        Self {
            id,
            item,
            subtitle_language: Some(subtitle_language),
            audio_language,
            state: SessionState::Idle,
            video: None,
            audio: None,
            subtitle: None,
            cancel: None,
            slot: None,
            degradation: Degradation::default(),
        }
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn item(&self) -> &MediaItem {
        &self.item
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Active (or, while loading, pending) subtitle language.
    #[must_use]
    pub fn subtitle_language(&self) -> Option<&LanguageCode> {
        self.subtitle_language.as_ref()
    }

    /// Active (or, while loading, pending) audio selection.
    #[must_use]
    pub fn audio_language(&self) -> &AudioSelection {
        &self.audio_language
    }

    #[must_use]
    pub fn video_handle(&self) -> Option<HandleId> {
        self.video.as_ref().filter(|v| v.is_live()).map(VideoHandle::id)
    }

    #[must_use]
    pub fn audio_handle(&self) -> Option<HandleId> {
        self.audio.as_ref().filter(|a| a.is_live()).map(DubbedAudio::id)
    }

    /// Source URL of the live dubbed element.
    #[must_use]
    pub fn audio_source(&self) -> Option<&str> {
        self.audio.as_ref().map(DubbedAudio::source_url)
    }

    #[must_use]
    pub fn subtitle_track(&self) -> Option<&SubtitleTrack> {
        self.subtitle.as_ref()
    }

    /// Mute state of the video engine, `None` without an engine.
    #[must_use]
    pub fn is_muted(&self) -> Option<bool> {
        self.video
            .as_ref()
            .and_then(VideoHandle::engine)
            .map(|engine| engine.is_muted())
    }

    /// Video position in seconds, `None` without an engine.
    #[must_use]
    pub fn position_secs(&self) -> Option<f64> {
        self.video
            .as_ref()
            .and_then(VideoHandle::engine)
            .map(|engine| engine.current_time())
    }

    #[must_use]
    pub fn degradation(&self) -> &Degradation {
        &self.degradation
    }

    pub(super) fn set_state(&mut self, state: SessionState) {
        self.state = state;
    }

    pub(super) fn set_subtitle_language(&mut self, language: Option<LanguageCode>) {
        self.subtitle_language = language;
    }

    pub(super) fn set_audio_language(&mut self, selection: AudioSelection) {
        self.audio_language = selection;
    }

    pub(super) fn degradation_mut(&mut self) -> &mut Degradation {
        &mut self.degradation
    }

    /// Removes the subtitle registration from the engine.
    pub(super) fn release_subtitle(&mut self) -> Option<HandleId> {
        let track = self.subtitle.take()?;
        if let Some(engine) = self.video.as_mut().and_then(VideoHandle::engine_mut) {
            engine.remove_remote_text_track(track.id());
        }
        Some(track.id())
    }

    /// Unsubscribes the follower from the video's transport, then disposes it.
    pub(super) fn release_audio(&mut self) -> Option<HandleId> {
        let mut audio = self.audio.take()?;
        if let Some(engine) = self.video.as_mut().and_then(VideoHandle::engine_mut) {
            engine.unsubscribe_transport(audio.id());
        }
        audio.dispose();
        Some(audio.id())
    }

    pub(super) fn release_video(&mut self) -> Option<HandleId> {
        let mut video = self.video.take()?;
        video.dispose();
        Some(video.id())
    }

    /// Cancels a pending acquisition, if any.
    pub(super) fn cancel_acquisition(&mut self) -> bool {
        match self.cancel.take() {
            Some(mut handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    /// Takes the engine the poll delivered, closing the slot behind it.
    pub(super) fn take_acquired(&mut self) -> Option<Box<dyn VideoEngine>> {
        self.slot.take().and_then(|slot| slot.take())
    }

    /// Closes the slot, disposing an engine that landed but was never attached.
    pub(super) fn discard_acquired(&mut self) -> bool {
        self.slot.take().is_some_and(|slot| slot.close())
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        self.cancel_acquisition();
        self.discard_acquired();
        self.release_subtitle();
        self.release_audio();
        self.release_video();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::media::MediaId;

    fn session() -> PlaybackSession {
        let en = LanguageCode::new("en").unwrap();
        let item = MediaItem::new(MediaId(7), "Airway", "uploads/airway.mp4")
            .with_subtitle_languages(vec![en.clone()]);
        PlaybackSession::new(SessionId(1), item, en, AudioSelection::Original)
    }

    #[test]
    fn new_session_is_idle_without_handles() {
        let session = session();
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.video_handle(), None);
        assert_eq!(session.audio_handle(), None);
        assert_eq!(session.is_muted(), None);
        assert!(!session.degradation().is_degraded());
    }

    #[test]
    fn releases_without_handles_are_noops() {
        let mut session = session();
        assert_eq!(session.release_subtitle(), None);
        assert_eq!(session.release_audio(), None);
        assert_eq!(session.release_video(), None);
        assert!(!session.cancel_acquisition());
        assert!(!session.discard_acquired());
        assert!(session.take_acquired().is_none());
    }

    #[test]
    fn degradation_reports_any_failed_track() {
        let degradation = Degradation {
            audio: None,
            subtitles: Some((LanguageCode::new("ja").unwrap(), "404".into())),
        };
        assert!(degradation.is_degraded());
    }
}
