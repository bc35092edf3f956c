// SPDX-License-Identifier: MPL-2.0
//! The playback synchronizer state machine.
//!
//! Owns at most one [`PlaybackSession`] at a time and drives it through
//! `Idle → Loading → Ready → Disposed`. Loading is split in two phases so a
//! host event loop can run the engine poll as a background task:
//!
//! 1. [`PlaybackSynchronizer::begin_load`] validates the request, disposes
//!    the previous session and returns a [`PendingLoad`]
//! 2. [`PendingLoad::wait`] runs the bounded, cancellable engine poll
//! 3. [`PlaybackSynchronizer::complete_load`] wires the acquired engine
//!
//! [`PlaybackSynchronizer::load`] chains the three for callers that can
//! simply await.

use super::acquire::{acquire_engine, cancel_pair, AcquirePolicy, EngineSlot};
use super::handles::{DubbedAudio, SubtitleTrack, VideoHandle};
use super::session::PlaybackSession;
use super::sync;
use crate::application::port::{
    event_channel, AudioElementFactory, EngineOptions, EngineProvider, EventReceiver, EventSender,
    EventSink, HandleId, MediaEvent, MediaSource, RemoteTextTrack, TrackMode, TransportEvent,
    VideoEngine,
};
use crate::catalog::MediaEndpoints;
use crate::config::Config;
use crate::diagnostics::{HandleKind, HistoryCapacity, SessionEventKind, SessionLog};
use crate::domain::error::{PlaybackError, TrackKind};
use crate::domain::media::{display_name, AudioSelection, LanguageCode, MediaItem};
use crate::domain::video::{SessionId, SessionState};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// What to play.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    pub item: MediaItem,
    /// Required; a load without a subtitle language is rejected.
    pub subtitle_language: Option<LanguageCode>,
    pub audio_language: AudioSelection,
}

impl LoadRequest {
    #[must_use]
    pub fn new(item: MediaItem) -> Self {
        Self {
            item,
            subtitle_language: None,
            audio_language: AudioSelection::Original,
        }
    }

    #[must_use]
    pub fn with_subtitles(mut self, language: LanguageCode) -> Self {
        self.subtitle_language = Some(language);
        self
    }

    #[must_use]
    pub fn with_audio(mut self, selection: AudioSelection) -> Self {
        self.audio_language = selection;
        self
    }
}

type Acquisition = BoxFuture<'static, Result<(), PlaybackError>>;

/// Engine acquisition for one session, not yet awaited.
pub struct PendingLoad {
    session: SessionId,
    acquisition: Acquisition,
}

impl PendingLoad {
    #[must_use]
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Runs the engine poll to completion (acquired, exhausted or cancelled).
    pub async fn wait(self) -> LoadOutcome {
        LoadOutcome {
            session: self.session,
            result: self.acquisition.await,
        }
    }
}

impl fmt::Debug for PendingLoad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingLoad")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

/// Result of a [`PendingLoad`], to be handed back to
/// [`PlaybackSynchronizer::complete_load`].
///
/// The outcome carries no engine: an acquired engine stays with its
/// session, so dropping or holding an outcome never keeps one alive.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome {
    session: SessionId,
    result: Result<(), PlaybackError>,
}

impl LoadOutcome {
    #[must_use]
    pub fn session(&self) -> SessionId {
        self.session
    }

    #[must_use]
    pub fn is_acquired(&self) -> bool {
        self.result.is_ok()
    }
}

/// Non-fatal report produced while a session is ready.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackNotice {
    /// A video transport event was applied to the dubbed audio.
    Mirrored(TransportEvent),
    /// The dubbed track failed; playback fell back to the original audio.
    AudioUnavailable {
        language: LanguageCode,
        message: String,
    },
    /// The subtitle track failed and was removed.
    SubtitlesUnavailable {
        language: LanguageCode,
        message: String,
    },
}

impl PlaybackNotice {
    /// Returns true for the degraded-playback notices.
    #[must_use]
    pub fn is_degradation(&self) -> bool {
        !matches!(self, Self::Mirrored(_))
    }
}

impl fmt::Display for PlaybackNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mirrored(event) => write!(f, "mirrored {event:?}"),
            Self::AudioUnavailable { language, message } => write!(
                f,
                "Dubbed audio ({}) unavailable, playing original audio: {}",
                display_name(language),
                message
            ),
            Self::SubtitlesUnavailable { language, message } => write!(
                f,
                "Subtitles ({}) unavailable: {}",
                display_name(language),
                message
            ),
        }
    }
}

/// Keeps one video engine, at most one dubbed audio element and at most one
/// remote subtitle track consistent across loads and language switches.
///
/// # Example
///
/// ```
/// use polyglot_player::domain::media::{AudioSelection, LanguageCode, MediaId, MediaItem};
/// use polyglot_player::domain::video::SessionState;
/// use polyglot_player::infrastructure::headless::HeadlessBackend;
/// use polyglot_player::video_player::{LoadRequest, PlaybackSynchronizer};
///
/// # let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
/// # rt.block_on(async {
/// let backend = HeadlessBackend::ready();
/// let mut player = PlaybackSynchronizer::new(backend.provider(), backend.audio_factory());
///
/// let en = LanguageCode::new("en").unwrap();
/// let item = MediaItem::new(MediaId(7), "Airway", "uploads/airway.mp4")
///     .with_subtitle_languages(vec![en.clone()]);
/// player.load(LoadRequest::new(item).with_subtitles(en)).await.unwrap();
///
/// assert_eq!(player.state(), SessionState::Ready);
/// assert_eq!(player.session().and_then(|s| s.is_muted()), Some(false));
/// # });
/// ```
pub struct PlaybackSynchronizer {
    provider: Arc<dyn EngineProvider>,
    audio_factory: Arc<dyn AudioElementFactory>,
    endpoints: MediaEndpoints,
    options: EngineOptions,
    policy: AcquirePolicy,
    session: Option<PlaybackSession>,
    next_session: u64,
    next_handle: u64,
    events_tx: EventSender,
    events_rx: EventReceiver,
    pending_notices: VecDeque<PlaybackNotice>,
    log: SessionLog,
}

impl PlaybackSynchronizer {
    /// Creates a synchronizer with default endpoints, options and poll policy.
    #[must_use]
    pub fn new(
        provider: Arc<dyn EngineProvider>,
        audio_factory: Arc<dyn AudioElementFactory>,
    ) -> Self {
        let (events_tx, events_rx) = event_channel();
        Self {
            provider,
            audio_factory,
            endpoints: MediaEndpoints::default(),
            options: EngineOptions::default(),
            policy: AcquirePolicy::default(),
            session: None,
            next_session: 0,
            next_handle: 0,
            events_tx,
            events_rx,
            pending_notices: VecDeque::new(),
            log: SessionLog::default(),
        }
    }

    /// Creates a synchronizer configured from user settings.
    #[must_use]
    pub fn from_config(
        config: &Config,
        provider: Arc<dyn EngineProvider>,
        audio_factory: Arc<dyn AudioElementFactory>,
    ) -> Self {
        Self::new(provider, audio_factory)
            .with_endpoints(MediaEndpoints::new(config.server_url()))
            .with_options(config.engine_options())
            .with_policy(config.acquire_policy())
            .with_log_capacity(config.history_capacity())
    }

    #[must_use]
    pub fn with_endpoints(mut self, endpoints: MediaEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: AcquirePolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_log_capacity(mut self, capacity: HistoryCapacity) -> Self {
        self.log = SessionLog::new(capacity);
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The current session, or the last one once it is disposed.
    #[must_use]
    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    /// State of the current session; `Idle` before the first load.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.session
            .as_ref()
            .map_or(SessionState::Idle, PlaybackSession::state)
    }

    #[must_use]
    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    #[must_use]
    pub fn endpoints(&self) -> &MediaEndpoints {
        &self.endpoints
    }

    #[must_use]
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    #[must_use]
    pub fn policy(&self) -> AcquirePolicy {
        self.policy
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Validates `request`, disposes the previous session and enters `Loading`.
    ///
    /// # Errors
    ///
    /// - [`PlaybackError::MissingSelection`] without a subtitle language
    /// - [`PlaybackError::InvalidSelection`] for a language the item does not offer
    ///
    /// Both leave the current session untouched.
    pub fn begin_load(&mut self, request: LoadRequest) -> Result<PendingLoad, PlaybackError> {
        let LoadRequest {
            item,
            subtitle_language,
            audio_language,
        } = request;

        let subtitle_language = subtitle_language.ok_or(PlaybackError::MissingSelection)?;
        if !item.supports_subtitle(&subtitle_language) {
            return Err(PlaybackError::InvalidSelection {
                kind: TrackKind::Subtitle,
                language: subtitle_language.to_string(),
            });
        }
        if !item.supports_audio(&audio_language) {
            return Err(PlaybackError::InvalidSelection {
                kind: TrackKind::Audio,
                language: audio_language.to_string(),
            });
        }

        if self.dispose_current() {
            tracing::debug!("previous session disposed before new load");
        }

        self.next_session += 1;
        let id = SessionId(self.next_session);
        tracing::info!(
            session = %id,
            video = %item.id,
            subtitles = %subtitle_language,
            audio = %audio_language,
            "loading"
        );

        let mut session = PlaybackSession::new(id, item, subtitle_language, audio_language);
        let (cancel, signal) = cancel_pair();
        let slot = EngineSlot::new();
        session.cancel = Some(cancel);
        session.slot = Some(slot.clone());
        self.transition(&mut session, SessionState::Loading);
        self.session = Some(session);

        let acquisition = acquire_engine(
            Arc::clone(&self.provider),
            self.options.clone(),
            self.policy,
            signal,
        )
        .map(move |acquired| acquired.and_then(|engine| slot.fill(engine)))
        .boxed();

        Ok(PendingLoad {
            session: id,
            acquisition,
        })
    }

    /// Attaches the acquired engine and moves the session to `Ready`.
    ///
    /// The engine itself is taken from the session, not from `outcome`. A
    /// superseded or stopped session already disposed whatever its poll
    /// delivered, so a stale outcome changes nothing.
    ///
    /// # Errors
    ///
    /// - [`PlaybackError::Cancelled`] for a stale outcome
    /// - [`PlaybackError::EngineUnavailable`] when the poll gave up; the
    ///   session is disposed
    /// - [`PlaybackError::Engine`] when the engine rejects the video source;
    ///   the session is disposed
    pub fn complete_load(&mut self, outcome: LoadOutcome) -> Result<SessionId, PlaybackError> {
        let LoadOutcome { session: id, result } = outcome;

        let is_current = self
            .session
            .as_ref()
            .is_some_and(|s| s.id() == id && s.state() == SessionState::Loading);
        let session = if is_current { self.session.take() } else { None };
        let Some(mut session) = session else {
            tracing::debug!(session = %id, "outcome of a superseded load ignored");
            return Err(PlaybackError::Cancelled);
        };

        session.cancel = None;
        let result = result
            .and_then(|()| session.take_acquired().ok_or(PlaybackError::Cancelled))
            .and_then(|engine| self.attach(&mut session, engine));

        if let Err(err) = &result {
            tracing::warn!(session = %id, %err, "load failed");
            self.record(
                id,
                SessionEventKind::LoadFailed {
                    reason: err.to_string(),
                },
            );
            self.release_all(&mut session);
            self.transition(&mut session, SessionState::Disposed);
        }

        self.session = Some(session);
        result.map(|()| id)
    }

    /// Loads `request` and waits until the session is ready.
    ///
    /// # Errors
    ///
    /// See [`begin_load`](Self::begin_load) and [`complete_load`](Self::complete_load).
    pub async fn load(&mut self, request: LoadRequest) -> Result<SessionId, PlaybackError> {
        let pending = self.begin_load(request)?;
        let outcome = pending.wait().await;
        self.complete_load(outcome)
    }

    /// Disposes the current session. Returns false if nothing was live.
    pub fn stop(&mut self) -> bool {
        let stopped = self.dispose_current();
        if stopped {
            tracing::info!("playback stopped");
        }
        stopped
    }

    // =========================================================================
    // Language switching
    // =========================================================================

    /// Switches the subtitle track. Video and audio handles are kept.
    ///
    /// While loading, only the pending selection changes.
    ///
    /// # Errors
    ///
    /// - [`PlaybackError::NotReady`] without a live session
    /// - [`PlaybackError::InvalidSelection`] for a language the item does not offer
    pub fn set_subtitle_language(&mut self, language: LanguageCode) -> Result<(), PlaybackError> {
        let session = self.live_session()?;
        if !session.item().supports_subtitle(&language) {
            return Err(PlaybackError::InvalidSelection {
                kind: TrackKind::Subtitle,
                language: language.to_string(),
            });
        }
        if session.subtitle_language() == Some(&language) {
            return Ok(());
        }
        if session.state() == SessionState::Loading {
            tracing::debug!(session = %session.id(), %language, "pending subtitle language updated");
            session.set_subtitle_language(Some(language));
            return Ok(());
        }

        let Some(mut session) = self.session.take() else {
            return Err(PlaybackError::NotReady);
        };
        if let Some(released) = session.release_subtitle() {
            self.record_release(&session, released, HandleKind::Subtitle);
        }
        if let Err(err) = self.attach_subtitle(&mut session, language.clone()) {
            let notice = self.drop_subtitles(&mut session, language, err.to_string());
            self.pending_notices.push_back(notice);
        }
        self.session = Some(session);
        Ok(())
    }

    /// Switches between the original audio and a dubbed track.
    ///
    /// The audio side is rebuilt (dispose, then recreate) and the session
    /// passes through `Loading` back to `Ready`. While loading, only the
    /// pending selection changes.
    ///
    /// # Errors
    ///
    /// - [`PlaybackError::NotReady`] without a live session
    /// - [`PlaybackError::InvalidSelection`] for a language the item does not offer
    pub fn set_audio_language(&mut self, selection: AudioSelection) -> Result<(), PlaybackError> {
        let session = self.live_session()?;
        if !session.item().supports_audio(&selection) {
            return Err(PlaybackError::InvalidSelection {
                kind: TrackKind::Audio,
                language: selection.to_string(),
            });
        }
        if *session.audio_language() == selection {
            return Ok(());
        }
        if session.state() == SessionState::Loading {
            tracing::debug!(session = %session.id(), audio = %selection, "pending audio selection updated");
            session.set_audio_language(selection);
            return Ok(());
        }

        let Some(mut session) = self.session.take() else {
            return Err(PlaybackError::NotReady);
        };
        self.transition(&mut session, SessionState::Loading);

        if let Some(released) = session.release_audio() {
            self.record_release(&session, released, HandleKind::Audio);
        }
        match selection {
            AudioSelection::Original => {
                if let Ok(engine) = engine_of(&mut session) {
                    engine.set_muted(false);
                }
                session.set_audio_language(AudioSelection::Original);
            }
            AudioSelection::Dubbed(language) => {
                if let Err(err) = self.attach_dubbed(&mut session, language.clone()) {
                    let notice = self.fall_back_to_original(&mut session, language, err.to_string());
                    self.pending_notices.push_back(notice);
                }
            }
        }

        self.transition(&mut session, SessionState::Ready);
        self.session = Some(session);
        Ok(())
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Applies every queued engine event without waiting.
    ///
    /// Events from handles that were already released are dropped.
    pub fn process_pending(&mut self) -> Vec<PlaybackNotice> {
        let mut notices: Vec<PlaybackNotice> = self.pending_notices.drain(..).collect();
        while let Ok((origin, event)) = self.events_rx.try_recv() {
            notices.extend(self.dispatch(origin, event));
        }
        notices
    }

    /// Waits until at least one notice is available, then returns all of them.
    pub async fn next_notices(&mut self) -> Vec<PlaybackNotice> {
        loop {
            let notices = self.process_pending();
            if !notices.is_empty() {
                return notices;
            }
            let Some((origin, event)) = self.events_rx.recv().await else {
                return Vec::new();
            };
            if let Some(notice) = self.dispatch(origin, event) {
                let mut notices = vec![notice];
                notices.extend(self.process_pending());
                return notices;
            }
        }
    }

    /// Realigns the dubbed audio with the video if it drifted past the
    /// tolerance. Returns true if a correction was applied.
    pub fn resync(&mut self) -> bool {
        let Some(session) = self.session.as_mut().filter(|s| s.state().is_ready()) else {
            return false;
        };
        let (Some(video), Some(audio)) = (session.video.as_ref(), session.audio.as_mut()) else {
            return false;
        };
        let (Some(engine), Some(follower)) = (video.engine(), audio.element_mut()) else {
            return false;
        };

        let video_secs = engine.current_time();
        if !sync::drift_exceeds_tolerance(video_secs, follower.current_time()) {
            return false;
        }
        tracing::debug!(position = video_secs, "dubbed audio drifted, resyncing");
        sync::apply(sync::FollowerCommand::SeekTo(video_secs.max(0.0)), follower);
        true
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn live_session(&mut self) -> Result<&mut PlaybackSession, PlaybackError> {
        self.session
            .as_mut()
            .filter(|s| s.state().is_live())
            .ok_or(PlaybackError::NotReady)
    }

    fn next_handle_id(&mut self) -> HandleId {
        self.next_handle += 1;
        HandleId::new(self.next_handle)
    }

    fn sink(&self, origin: HandleId) -> EventSink {
        EventSink::new(origin, self.events_tx.clone())
    }

    fn record(&mut self, session: SessionId, kind: SessionEventKind) {
        self.log.record(session, kind);
    }

    fn record_acquire(&mut self, session: &PlaybackSession, handle: HandleId, kind: HandleKind) {
        tracing::debug!(session = %session.id(), %handle, ?kind, "handle acquired");
        self.record(session.id(), SessionEventKind::HandleAcquired { handle, kind });
    }

    fn record_release(&mut self, session: &PlaybackSession, handle: HandleId, kind: HandleKind) {
        tracing::debug!(session = %session.id(), %handle, ?kind, "handle released");
        self.record(session.id(), SessionEventKind::HandleReleased { handle, kind });
    }

    fn transition(&mut self, session: &mut PlaybackSession, to: SessionState) {
        let from = session.state();
        debug_assert!(
            from.can_transition_to(to),
            "invalid session transition {from} -> {to}"
        );
        session.set_state(to);
        tracing::debug!(session = %session.id(), %from, %to, "session state changed");
        self.record(session.id(), SessionEventKind::StateChanged { from, to });
    }

    /// Releases the current session and marks it disposed.
    ///
    /// Returns true if a live session was disposed.
    fn dispose_current(&mut self) -> bool {
        let Some(mut session) = self.session.take() else {
            return false;
        };
        let was_live = session.state().is_live();
        if was_live {
            self.release_all(&mut session);
            self.transition(&mut session, SessionState::Disposed);
        }
        self.session = Some(session);
        was_live
    }

    /// Cancels the poll and disposes an engine that landed but was never
    /// attached, then releases subtitle, audio and video in that order.
    fn release_all(&mut self, session: &mut PlaybackSession) {
        if session.cancel_acquisition() {
            tracing::debug!(session = %session.id(), "pending engine acquisition cancelled");
        }
        if session.discard_acquired() {
            tracing::debug!(session = %session.id(), "acquired engine disposed before attach");
        }
        if let Some(handle) = session.release_subtitle() {
            self.record_release(session, handle, HandleKind::Subtitle);
        }
        if let Some(handle) = session.release_audio() {
            self.record_release(session, handle, HandleKind::Audio);
        }
        if let Some(handle) = session.release_video() {
            self.record_release(session, handle, HandleKind::Video);
        }
    }

    fn attach(
        &mut self,
        session: &mut PlaybackSession,
        engine: Box<dyn VideoEngine>,
    ) -> Result<(), PlaybackError> {
        let video_id = self.next_handle_id();
        session.video = Some(VideoHandle::new(video_id, engine));
        self.record_acquire(session, video_id, HandleKind::Video);

        let source = MediaSource::mp4(self.endpoints.video(session.item()));
        {
            let engine = engine_of(session)?;
            engine.set_source(&source)?;
            engine.set_muted(false);
        }

        if let Some(language) = session.subtitle_language().cloned() {
            if let Err(err) = self.attach_subtitle(session, language.clone()) {
                let notice = self.drop_subtitles(session, language, err.to_string());
                self.pending_notices.push_back(notice);
            }
        }

        if let AudioSelection::Dubbed(language) = session.audio_language().clone() {
            if let Err(err) = self.attach_dubbed(session, language.clone()) {
                let notice = self.fall_back_to_original(session, language, err.to_string());
                self.pending_notices.push_back(notice);
            }
        }

        self.transition(session, SessionState::Ready);
        tracing::info!(session = %session.id(), source = %source.url, "ready");
        Ok(())
    }

    fn attach_subtitle(
        &mut self,
        session: &mut PlaybackSession,
        language: LanguageCode,
    ) -> Result<(), PlaybackError> {
        let id = self.next_handle_id();
        let url = self.endpoints.subtitles(session.item().id, &language);
        let track = RemoteTextTrack {
            url: url.clone(),
            language: language.clone(),
            label: display_name(&language).to_string(),
            default: true,
        };
        let sink = self.sink(id);

        let engine = engine_of(session)?;
        engine.add_remote_text_track(&track, sink)?;
        if let Err(err) = engine.set_text_track_mode(id, TrackMode::Showing) {
            engine.remove_remote_text_track(id);
            return Err(err);
        }

        let mut handle = SubtitleTrack::new(id, language.clone(), url);
        handle.set_mode(TrackMode::Showing);
        session.subtitle = Some(handle);
        session.set_subtitle_language(Some(language));
        self.record_acquire(session, id, HandleKind::Subtitle);
        Ok(())
    }

    /// Mutes the video, creates the dubbed element, aligns it and subscribes
    /// it to the video's transport events.
    fn attach_dubbed(
        &mut self,
        session: &mut PlaybackSession,
        language: LanguageCode,
    ) -> Result<(), PlaybackError> {
        let id = self.next_handle_id();
        let url = self.endpoints.dubbed_audio(session.item().id, &language);
        let element_sink = self.sink(id);
        let transport_sink = self.sink(id);

        let engine = engine_of(session)?;
        engine.set_muted(true);
        let element = match self.audio_factory.create(&url, element_sink) {
            Ok(element) => element,
            Err(err) => {
                engine.set_muted(false);
                return Err(err);
            }
        };

        let mut audio = DubbedAudio::new(id, language.clone(), url, element);
        if let Some(follower) = audio.element_mut() {
            sync::align_follower(engine, follower);
        }
        engine.subscribe_transport(transport_sink);

        session.audio = Some(audio);
        session.set_audio_language(AudioSelection::Dubbed(language));
        self.record_acquire(session, id, HandleKind::Audio);
        Ok(())
    }

    /// Drops the dubbed track and restores the original audio.
    fn fall_back_to_original(
        &mut self,
        session: &mut PlaybackSession,
        language: LanguageCode,
        message: String,
    ) -> PlaybackNotice {
        if let Some(handle) = session.release_audio() {
            self.record_release(session, handle, HandleKind::Audio);
        }
        if let Ok(engine) = engine_of(session) {
            engine.set_muted(false);
        }
        session.set_audio_language(AudioSelection::Original);
        session.degradation_mut().audio = Some((language.clone(), message.clone()));

        tracing::warn!(
            session = %session.id(),
            %language,
            %message,
            "dubbed audio unavailable, falling back to original audio"
        );
        self.record(
            session.id(),
            SessionEventKind::Degraded {
                track: TrackKind::Audio,
                message: message.clone(),
            },
        );
        PlaybackNotice::AudioUnavailable { language, message }
    }

    /// Removes the subtitle track and treats subtitles as absent.
    fn drop_subtitles(
        &mut self,
        session: &mut PlaybackSession,
        language: LanguageCode,
        message: String,
    ) -> PlaybackNotice {
        if let Some(handle) = session.release_subtitle() {
            self.record_release(session, handle, HandleKind::Subtitle);
        }
        session.set_subtitle_language(None);
        session.degradation_mut().subtitles = Some((language.clone(), message.clone()));

        tracing::warn!(
            session = %session.id(),
            %language,
            %message,
            "subtitles unavailable, continuing without them"
        );
        self.record(
            session.id(),
            SessionEventKind::Degraded {
                track: TrackKind::Subtitle,
                message: message.clone(),
            },
        );
        PlaybackNotice::SubtitlesUnavailable { language, message }
    }

    fn dispatch(&mut self, origin: HandleId, event: MediaEvent) -> Option<PlaybackNotice> {
        let mut session = self.session.take()?;
        let notice = self.route(&mut session, origin, event);
        self.session = Some(session);
        notice
    }

    fn route(
        &mut self,
        session: &mut PlaybackSession,
        origin: HandleId,
        event: MediaEvent,
    ) -> Option<PlaybackNotice> {
        if !session.state().is_ready() {
            tracing::trace!(%origin, state = %session.state(), "event outside ready state dropped");
            return None;
        }

        match event {
            MediaEvent::Transport(transport) => {
                let transport = match session.video.as_ref().and_then(VideoHandle::engine) {
                    Some(engine) => sync::at_video_position(transport, engine),
                    None => transport,
                };
                let Some(follower) = session
                    .audio
                    .as_mut()
                    .filter(|audio| audio.id() == origin)
                    .and_then(DubbedAudio::element_mut)
                else {
                    tracing::trace!(%origin, "transport event from released handle dropped");
                    return None;
                };
                sync::apply(sync::mirror(transport), follower);
                Some(PlaybackNotice::Mirrored(transport))
            }
            MediaEvent::AudioFailed { message } => {
                let Some(language) = session
                    .audio
                    .as_ref()
                    .filter(|audio| audio.id() == origin)
                    .map(|audio| audio.language().clone())
                else {
                    tracing::trace!(%origin, "audio error from released handle dropped");
                    return None;
                };
                Some(self.fall_back_to_original(session, language, message))
            }
            MediaEvent::SubtitleFailed { message } => {
                let Some(language) = session
                    .subtitle
                    .as_ref()
                    .filter(|track| track.id() == origin)
                    .map(|track| track.language().clone())
                else {
                    tracing::trace!(%origin, "subtitle error from released handle dropped");
                    return None;
                };
                Some(self.drop_subtitles(session, language, message))
            }
        }
    }
}

fn engine_of(
    session: &mut PlaybackSession,
) -> Result<&mut (dyn VideoEngine + 'static), PlaybackError> {
    session
        .video
        .as_mut()
        .and_then(VideoHandle::engine_mut)
        .ok_or(PlaybackError::NotReady)
}

impl Drop for PlaybackSynchronizer {
    fn drop(&mut self) {
        self.dispose_current();
    }
}

impl fmt::Debug for PlaybackSynchronizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackSynchronizer")
            .field("endpoints", &self.endpoints)
            .field("policy", &self.policy)
            .field("session", &self.session)
            .field("log_len", &self.log.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::headless::HeadlessBackend;
    use crate::test_utils::{airway_item as item, lang as code};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn player(backend: &HeadlessBackend) -> PlaybackSynchronizer {
        PlaybackSynchronizer::new(backend.provider(), backend.audio_factory())
    }

    /// Engine without a `Drop` impl: only an explicit `dispose` releases it.
    struct CountingEngine {
        disposals: Arc<AtomicUsize>,
        muted: bool,
    }

    impl VideoEngine for CountingEngine {
        fn set_source(&mut self, _source: &MediaSource) -> Result<(), PlaybackError> {
            Ok(())
        }

        fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }

        fn is_muted(&self) -> bool {
            self.muted
        }

        fn is_paused(&self) -> bool {
            true
        }

        fn current_time(&self) -> f64 {
            0.0
        }

        fn playback_rate(&self) -> f64 {
            1.0
        }

        fn add_remote_text_track(
            &mut self,
            _track: &RemoteTextTrack,
            _sink: EventSink,
        ) -> Result<(), PlaybackError> {
            Ok(())
        }

        fn remove_remote_text_track(&mut self, _id: HandleId) {}

        fn set_text_track_mode(
            &mut self,
            _id: HandleId,
            _mode: TrackMode,
        ) -> Result<(), PlaybackError> {
            Ok(())
        }

        fn subscribe_transport(&mut self, _sink: EventSink) {}

        fn unsubscribe_transport(&mut self, _id: HandleId) {}

        fn dispose(&mut self) {
            self.disposals.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct CountingProvider {
        disposals: Arc<AtomicUsize>,
    }

    impl EngineProvider for CountingProvider {
        fn try_acquire(&self, _options: &EngineOptions) -> Option<Box<dyn VideoEngine>> {
            Some(Box::new(CountingEngine {
                disposals: Arc::clone(&self.disposals),
                muted: false,
            }))
        }
    }

    fn counting_player() -> (Arc<AtomicUsize>, PlaybackSynchronizer) {
        let provider = CountingProvider::default();
        let disposals = Arc::clone(&provider.disposals);
        let backend = HeadlessBackend::ready();
        let player = PlaybackSynchronizer::new(Arc::new(provider), backend.audio_factory());
        (disposals, player)
    }

    #[tokio::test]
    async fn load_without_subtitles_is_rejected() {
        let backend = HeadlessBackend::ready();
        let mut player = player(&backend);

        let err = player.begin_load(LoadRequest::new(item())).unwrap_err();
        assert_eq!(err, PlaybackError::MissingSelection);
        assert_eq!(player.state(), SessionState::Idle);
        assert!(player.log().is_empty());
    }

    #[tokio::test]
    async fn unknown_audio_language_is_rejected() {
        let backend = HeadlessBackend::ready();
        let mut player = player(&backend);

        let err = player
            .begin_load(
                LoadRequest::new(item())
                    .with_subtitles(code("en"))
                    .with_audio(AudioSelection::Dubbed(code("ko"))),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            PlaybackError::InvalidSelection {
                kind: TrackKind::Audio,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn begin_load_enters_loading() {
        let backend = HeadlessBackend::ready();
        let mut player = player(&backend);

        let pending = player
            .begin_load(LoadRequest::new(item()).with_subtitles(code("en")))
            .unwrap();
        assert_eq!(player.state(), SessionState::Loading);
        assert_eq!(pending.session(), SessionId(1));
        assert_eq!(player.session().and_then(PlaybackSession::video_handle), None);
    }

    #[tokio::test]
    async fn switch_while_loading_updates_pending_selection() {
        let backend = HeadlessBackend::ready();
        let mut player = player(&backend);

        let pending = player
            .begin_load(LoadRequest::new(item()).with_subtitles(code("en")))
            .unwrap();
        player.set_subtitle_language(code("ja")).unwrap();
        player
            .set_audio_language(AudioSelection::Dubbed(code("ja")))
            .unwrap();

        let outcome = pending.wait().await;
        player.complete_load(outcome).unwrap();

        let session = player.session().unwrap();
        assert_eq!(session.subtitle_language(), Some(&code("ja")));
        assert_eq!(session.is_muted(), Some(true));
        assert!(session.audio_handle().is_some());
    }

    #[tokio::test]
    async fn switch_without_session_is_not_ready() {
        let backend = HeadlessBackend::ready();
        let mut player = player(&backend);

        assert_eq!(
            player.set_subtitle_language(code("en")),
            Err(PlaybackError::NotReady)
        );
        assert_eq!(
            player.set_audio_language(AudioSelection::Original),
            Err(PlaybackError::NotReady)
        );
    }

    #[tokio::test]
    async fn selecting_active_language_is_a_noop() {
        let backend = HeadlessBackend::ready();
        let mut player = player(&backend);
        player
            .load(LoadRequest::new(item()).with_subtitles(code("en")))
            .await
            .unwrap();
        let before = player.log().len();

        player.set_subtitle_language(code("en")).unwrap();
        player.set_audio_language(AudioSelection::Original).unwrap();

        assert_eq!(player.log().len(), before);
    }

    #[tokio::test]
    async fn stale_outcome_engine_is_disposed() {
        let backend = HeadlessBackend::ready();
        let mut player = player(&backend);

        let first = player
            .begin_load(LoadRequest::new(item()).with_subtitles(code("en")))
            .unwrap();
        let first_outcome = first.wait().await;
        assert!(first_outcome.is_acquired());

        player.stop();
        assert_eq!(
            player.complete_load(first_outcome).unwrap_err(),
            PlaybackError::Cancelled
        );
        assert_eq!(backend.recorder().live_engines(), 0);
    }

    #[tokio::test]
    async fn rejected_source_disposes_session() {
        let backend = HeadlessBackend::ready();
        backend.recorder().reject_sources(true);
        let mut player = player(&backend);

        let err = player
            .load(LoadRequest::new(item()).with_subtitles(code("en")))
            .await
            .unwrap_err();

        assert!(matches!(err, PlaybackError::Engine(_)));
        assert_eq!(player.state(), SessionState::Disposed);
        assert_eq!(backend.recorder().live_engines(), 0);
    }

    #[tokio::test]
    async fn resync_corrects_drift_only() {
        let backend = HeadlessBackend::ready();
        let mut player = player(&backend);
        player
            .load(
                LoadRequest::new(item())
                    .with_subtitles(code("en"))
                    .with_audio(AudioSelection::Dubbed(code("ja"))),
            )
            .await
            .unwrap();

        assert!(!player.resync());
        backend.recorder().drift_audio(2.0);
        assert!(player.resync());
        assert!(!player.resync());
    }

    #[tokio::test]
    async fn dropping_the_synchronizer_releases_everything() {
        let backend = HeadlessBackend::ready();
        let mut player = player(&backend);
        player
            .load(
                LoadRequest::new(item())
                    .with_subtitles(code("en"))
                    .with_audio(AudioSelection::Dubbed(code("ja"))),
            )
            .await
            .unwrap();
        assert_eq!(backend.recorder().live_audio(), 1);

        drop(player);

        assert_eq!(backend.recorder().live_engines(), 0);
        assert_eq!(backend.recorder().live_audio(), 0);
    }

    #[tokio::test]
    async fn dropped_outcome_leaves_engine_with_the_session() {
        let (disposals, mut player) = counting_player();

        let pending = player
            .begin_load(LoadRequest::new(item()).with_subtitles(code("en")))
            .unwrap();
        let outcome = pending.wait().await;
        assert!(outcome.is_acquired());
        drop(outcome);
        assert_eq!(disposals.load(Ordering::SeqCst), 0);

        assert!(player.stop());
        assert_eq!(disposals.load(Ordering::SeqCst), 1);

        drop(player);
        assert_eq!(disposals.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn dropping_the_synchronizer_disposes_unattached_engine() {
        let (disposals, mut player) = counting_player();

        let pending = player
            .begin_load(LoadRequest::new(item()).with_subtitles(code("en")))
            .unwrap();
        let outcome = pending.wait().await;
        drop(player);

        assert_eq!(disposals.load(Ordering::SeqCst), 1);
        drop(outcome);
        assert_eq!(disposals.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn held_outcome_is_disposed_before_next_acquisition() {
        let (disposals, mut player) = counting_player();

        let first = player
            .begin_load(LoadRequest::new(item()).with_subtitles(code("en")))
            .unwrap();
        let first_outcome = first.wait().await;

        let second = player
            .begin_load(LoadRequest::new(item()).with_subtitles(code("ja")))
            .unwrap();
        assert_eq!(disposals.load(Ordering::SeqCst), 1);

        let second_outcome = second.wait().await;
        assert_eq!(
            player.complete_load(first_outcome),
            Err(PlaybackError::Cancelled)
        );
        assert_eq!(player.complete_load(second_outcome), Ok(SessionId(2)));
        assert_eq!(disposals.load(Ordering::SeqCst), 1);
        assert_eq!(player.state(), SessionState::Ready);
    }

    #[tokio::test]
    async fn seek_mirrors_the_video_position_not_the_payload() {
        let backend = HeadlessBackend::ready();
        let mut player = player(&backend);
        player
            .load(
                LoadRequest::new(item())
                    .with_subtitles(code("en"))
                    .with_audio(AudioSelection::Dubbed(code("ja"))),
            )
            .await
            .unwrap();
        let recorder = backend.recorder();

        recorder.drift_video(12.0);
        recorder.deliver_transport(TransportEvent::Seeked { position_secs: 0.0 });
        let notices = player.process_pending();

        assert_eq!(
            notices,
            vec![PlaybackNotice::Mirrored(TransportEvent::Seeked {
                position_secs: 12.0
            })]
        );
        let audio = recorder.current_audio().unwrap();
        assert_eq!(audio.seeks.last().copied(), Some(12.0));
    }

    #[test]
    fn notice_display_names_language() {
        let notice = PlaybackNotice::AudioUnavailable {
            language: code("ja"),
            message: "404".into(),
        };
        assert_eq!(
            notice.to_string(),
            "Dubbed audio (日本語) unavailable, playing original audio: 404"
        );
        assert!(notice.is_degradation());
        assert!(!PlaybackNotice::Mirrored(TransportEvent::Play).is_degradation());
    }
}
