//! Speech synthesis adapter
//!
//! At most one utterance is in flight: every `speak` cancels the previous one
//! first. Events carry the utterance id so late events from a canceled
//! utterance are dropped instead of clobbering the current one.

/// Error when the platform has no synthesizer
pub const NOT_SUPPORTED: &str = "Speech synthesis is not supported in this browser.";

/// A voice from the platform catalogue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    /// Display name
    pub name: String,
    /// Declared locale (e.g. "es-ES")
    pub lang: String,
}

/// One unit of speech output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    /// Text to speak
    pub text: String,
    /// Requested locale
    pub lang: String,
    /// Selected voice; `None` lets the platform choose for `lang`
    pub voice: Option<Voice>,
}

/// Platform-issued utterance handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtteranceId(pub u64);

/// Platform speech-synthesis capability
pub trait SynthesisPlatform {
    /// Current voice catalogue; may be empty until the platform has loaded it
    fn voices(&self) -> Vec<Voice>;

    /// Queue an utterance
    ///
    /// # Errors
    ///
    /// Returns the platform's error descriptor when the utterance is refused
    fn speak(&mut self, utterance: Utterance) -> std::result::Result<UtteranceId, String>;

    /// Drop every queued and speaking utterance
    fn cancel(&mut self);
}

/// Events delivered by the platform synthesizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisEvent {
    /// The voice catalogue changed
    VoicesChanged,
    /// An utterance started playing
    Start(UtteranceId),
    /// An utterance finished
    End(UtteranceId),
    /// An utterance failed with the platform's error descriptor
    Error(UtteranceId, String),
}

/// What handling an event changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisOutcome {
    /// Stale or irrelevant event
    Ignored,
    /// Voice catalogue populated
    VoicesLoaded,
    /// Current utterance started
    Started,
    /// Current utterance finished
    Finished,
    /// Current utterance failed
    Failed,
}

type EndCallback = Box<dyn FnMut()>;
type ErrorCallback = Box<dyn FnMut(&str)>;

/// Speech synthesis adapter
pub struct SynthesisAdapter {
    platform: Option<Box<dyn SynthesisPlatform>>,
    voices: Vec<Voice>,
    voices_loaded: bool,
    current: Option<UtteranceId>,
    speaking: bool,
    error: Option<String>,
    on_end: Option<EndCallback>,
    on_error: Option<ErrorCallback>,
}

impl SynthesisAdapter {
    /// Create an adapter and try to load the voice catalogue
    ///
    /// Pass `None` when the environment has no speech stack at all.
    #[must_use]
    pub fn new(platform: Option<Box<dyn SynthesisPlatform>>) -> Self {
        let mut adapter = Self {
            platform,
            voices: Vec::new(),
            voices_loaded: false,
            current: None,
            speaking: false,
            error: None,
            on_end: None,
            on_error: None,
        };
        adapter.load_voices();
        adapter
    }

    /// Invoke `f` when the current utterance finishes
    #[must_use]
    pub fn on_end(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_end = Some(Box::new(f));
        self
    }

    /// Invoke `f` with the error descriptor when speaking fails
    #[must_use]
    pub fn on_error(mut self, f: impl FnMut(&str) + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    /// Whether the platform can synthesize speech
    #[must_use]
    pub const fn is_supported(&self) -> bool {
        self.platform.is_some()
    }

    /// Speak `text` in locale `lang`, replacing any current utterance
    pub fn speak(&mut self, text: &str, lang: &str) {
        if text.trim().is_empty() {
            tracing::debug!("speak ignored, empty text");
            return;
        }

        let Some(platform) = self.platform.as_mut() else {
            tracing::warn!("speech synthesis unavailable");
            self.fail(NOT_SUPPORTED.to_string(), "Speech synthesis not supported");
            return;
        };

        platform.cancel();
        self.current = None;
        self.speaking = false;
        self.error = None;

        let catalogue = if self.voices_loaded {
            self.voices.clone()
        } else {
            platform.voices()
        };
        let voice = select_voice(&catalogue, lang).cloned();

        tracing::debug!(lang, voice = ?voice.as_ref().map(|v| &v.name), "speaking");

        let utterance = Utterance {
            text: text.to_string(),
            lang: lang.to_string(),
            voice,
        };

        match platform.speak(utterance) {
            Ok(id) => self.current = Some(id),
            Err(e) => {
                tracing::error!(error = %e, "speech synthesis refused utterance");
                self.fail(format!("Speech synthesis error: {e}"), &e);
            }
        }
    }

    /// Cancel speech; always safe, even when nothing is speaking
    pub fn cancel(&mut self) {
        if let Some(platform) = self.platform.as_mut() {
            platform.cancel();
        }
        self.current = None;
        self.speaking = false;
    }

    /// Apply a platform event
    pub fn handle_event(&mut self, event: SynthesisEvent) -> SynthesisOutcome {
        match event {
            SynthesisEvent::VoicesChanged => {
                if self.load_voices() {
                    SynthesisOutcome::VoicesLoaded
                } else {
                    SynthesisOutcome::Ignored
                }
            }
            SynthesisEvent::Start(id) if self.current == Some(id) => {
                self.speaking = true;
                SynthesisOutcome::Started
            }
            SynthesisEvent::End(id) if self.current == Some(id) => {
                self.current = None;
                self.speaking = false;
                tracing::debug!("utterance finished");
                if let Some(cb) = self.on_end.as_mut() {
                    cb();
                }
                SynthesisOutcome::Finished
            }
            SynthesisEvent::Error(id, descriptor) if self.current == Some(id) => {
                self.current = None;
                tracing::error!(error = %descriptor, "speech synthesis error");
                self.fail(format!("Speech synthesis error: {descriptor}"), &descriptor);
                SynthesisOutcome::Failed
            }
            other => {
                tracing::trace!(event = ?other, "stale synthesis event");
                SynthesisOutcome::Ignored
            }
        }
    }

    /// Whether an utterance is playing
    #[must_use]
    pub const fn is_speaking(&self) -> bool {
        self.speaking
    }

    /// Current error, if any
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Loaded voice catalogue
    #[must_use]
    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    /// Utterance currently in flight
    #[must_use]
    pub const fn current_utterance(&self) -> Option<UtteranceId> {
        self.current
    }

    /// Populate the catalogue once; returns true when this call loaded it
    fn load_voices(&mut self) -> bool {
        if self.voices_loaded {
            return false;
        }
        let Some(platform) = self.platform.as_ref() else {
            return false;
        };

        let voices = platform.voices();
        if voices.is_empty() {
            return false;
        }

        tracing::debug!(count = voices.len(), "voice catalogue loaded");
        self.voices = voices;
        self.voices_loaded = true;
        true
    }

    fn fail(&mut self, message: String, descriptor: &str) {
        self.speaking = false;
        self.error = Some(message);
        if let Some(cb) = self.on_error.as_mut() {
            cb(descriptor);
        }
    }
}

/// First voice whose locale shares the requested locale's two-letter prefix
#[must_use]
pub fn select_voice<'a>(voices: &'a [Voice], lang: &str) -> Option<&'a Voice> {
    let prefix = lang.get(..2).unwrap_or(lang);
    if prefix.is_empty() {
        return None;
    }

    voices.iter().find(|v| {
        v.lang
            .get(..prefix.len())
            .is_some_and(|p| p.eq_ignore_ascii_case(prefix))
    })
}
