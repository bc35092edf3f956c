// SPDX-License-Identifier: MPL-2.0
//! In-process dubbed audio elements.

use super::recorder::HeadlessRecorder;
use crate::application::port::{AudioElement, AudioElementFactory, EventSink};
use crate::domain::error::PlaybackError;

#[derive(Debug, Clone)]
pub struct HeadlessAudioFactory {
    recorder: HeadlessRecorder,
}

impl HeadlessAudioFactory {
    #[must_use]
    pub fn new(recorder: HeadlessRecorder) -> Self {
        Self { recorder }
    }
}

impl AudioElementFactory for HeadlessAudioFactory {
    fn create(&self, url: &str, sink: EventSink) -> Result<Box<dyn AudioElement>, PlaybackError> {
        if self.recorder.rejects_audio() {
            return Err(PlaybackError::Engine(format!("cannot open audio {url}")));
        }
        let index = self.recorder.register_audio(url, sink);
        Ok(Box::new(HeadlessAudio {
            recorder: self.recorder.clone(),
            index,
            disposed: false,
        }))
    }
}

/// Audio element that records every command it receives.
#[derive(Debug)]
pub struct HeadlessAudio {
    recorder: HeadlessRecorder,
    index: usize,
    disposed: bool,
}

impl AudioElement for HeadlessAudio {
    fn play(&mut self) {
        self.recorder.with_audio(self.index, |a| {
            a.playing = true;
            a.play_calls += 1;
        });
    }

    fn pause(&mut self) {
        self.recorder.with_audio(self.index, |a| {
            a.playing = false;
            a.pause_calls += 1;
        });
    }

    fn set_current_time(&mut self, position_secs: f64) {
        self.recorder.with_audio(self.index, |a| {
            a.position_secs = position_secs;
            a.seeks.push(position_secs);
        });
    }

    fn current_time(&self) -> f64 {
        self.recorder
            .with_audio(self.index, |a| a.position_secs)
            .unwrap_or_default()
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.recorder.with_audio(self.index, |a| a.rate = rate);
    }

    fn dispose(&mut self) {
        if !self.disposed {
            self.disposed = true;
            self.recorder.dispose_audio(self.index);
        }
    }
}

impl Drop for HeadlessAudio {
    fn drop(&mut self) {
        self.dispose();
    }
}
