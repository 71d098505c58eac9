//! Recording host doubles.
//!
//! Speech and tone doubles remember every call; the listener answers from a
//! script of transcripts and failures.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use arcade_media::MediaError;
use async_trait::async_trait;

use crate::capabilities::{SpeechInput, SpeechOutput, Tone, TonePlayer, Utterance};

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Speech playback that records utterances instead of speaking.
#[derive(Debug, Default)]
pub struct RecordingSpeech {
    utterances: Mutex<Vec<Utterance>>,
    stops: AtomicUsize,
}

impl RecordingSpeech {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything spoken so far.
    #[must_use]
    pub fn utterances(&self) -> Vec<Utterance> {
        lock(&self.utterances).clone()
    }

    /// Texts spoken so far.
    #[must_use]
    pub fn texts(&self) -> Vec<String> {
        lock(&self.utterances)
            .iter()
            .map(|utterance| utterance.text.clone())
            .collect()
    }

    /// Times speech was stopped.
    #[must_use]
    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl SpeechOutput for RecordingSpeech {
    fn speak(&self, utterance: &Utterance) {
        lock(&self.utterances).push(utterance.clone());
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Tone playback that records tones instead of playing them.
#[derive(Debug, Default)]
pub struct RecordingTones {
    played: Mutex<Vec<Tone>>,
}

impl RecordingTones {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tones played so far, in order.
    #[must_use]
    pub fn played(&self) -> Vec<Tone> {
        lock(&self.played).clone()
    }

    /// How often `tone` was played.
    #[must_use]
    pub fn count(&self, tone: Tone) -> usize {
        lock(&self.played).iter().filter(|t| **t == tone).count()
    }
}

impl TonePlayer for RecordingTones {
    fn play_tone(&self, tone: Tone) {
        lock(&self.played).push(tone);
    }
}

/// Speech recognition that replays canned results.
///
/// An exhausted script answers `DeviceUnavailable`.
#[derive(Debug, Default)]
pub struct ScriptedListener {
    script: Mutex<VecDeque<Result<String, MediaError>>>,
    languages: Mutex<Vec<String>>,
}

impl ScriptedListener {
    /// Hears each transcript in turn.
    #[must_use]
    pub fn hearing<I, S>(transcripts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_script(transcripts.into_iter().map(|t| Ok(t.into())))
    }

    /// Replays `script` in order.
    #[must_use]
    pub fn from_script(script: impl IntoIterator<Item = Result<String, MediaError>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            languages: Mutex::new(Vec::new()),
        }
    }

    /// Locales passed to each `listen` call.
    #[must_use]
    pub fn languages(&self) -> Vec<String> {
        lock(&self.languages).clone()
    }
}

#[async_trait]
impl SpeechInput for ScriptedListener {
    async fn listen(&self, language: &str) -> Result<String, MediaError> {
        lock(&self.languages).push(language.to_string());
        lock(&self.script).pop_front().unwrap_or_else(|| {
            Err(MediaError::DeviceUnavailable(
                "no scripted transcript left".to_string(),
            ))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tokio_test::{assert_err, assert_ok};

    use super::*;
    use crate::capabilities::Voice;

    #[tokio::test]
    async fn test_listener_replays_then_runs_dry() {
        let listener = ScriptedListener::from_script([
            Ok("comida".to_string()),
            Err(MediaError::PermissionDenied(arcade_media::DeviceKind::Microphone)),
        ]);
        assert_eq!(assert_ok!(listener.listen("es-ES").await), "comida");
        assert_err!(listener.listen("es-ES").await);
        assert!(matches!(
            listener.listen("es-ES").await,
            Err(MediaError::DeviceUnavailable(_))
        ));
        assert_eq!(listener.languages().len(), 3);
    }

    #[test]
    fn test_recorders() {
        let speech = RecordingSpeech::new();
        speech.speak(&Utterance {
            text: "Nivel 2".to_string(),
            voice: Voice::default(),
            interrupt: false,
            language: "es-ES".to_string(),
        });
        speech.stop();
        assert_eq!(speech.texts(), vec!["Nivel 2".to_string()]);
        assert_eq!(speech.stop_count(), 1);

        let tones = RecordingTones::new();
        tones.play_tone(Tone::Click);
        tones.play_tone(Tone::Win);
        tones.play_tone(Tone::Click);
        assert_eq!(tones.count(Tone::Click), 2);
        assert_eq!(tones.played().last(), Some(&Tone::Click));
    }
}
