//! Speech recognition adapter
//!
//! Wraps a platform recognizer as an `Idle -> Starting -> Listening -> Idle`
//! state machine. Platform callbacks are fed in as [`RecognitionEvent`]s and
//! may arrive late, twice or out of order; every transition is idempotent.

use std::sync::LazyLock;

use regex::Regex;

/// Error when the platform has no recognizer
pub const NOT_SUPPORTED: &str = "Speech recognition is not supported in this browser.";

/// Error on iOS, where the engine exists but does not work
pub const IOS_NOT_SUPPORTED: &str = "Speech recognition is not supported on iOS Safari.";

/// Error when the platform refuses to start a session
pub const START_FAILED: &str = "Error starting speech recognition";

static IOS_USER_AGENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)iPhone|iPad|iPod").expect("valid regex"));

/// Settings applied to a platform recognizer at creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizerConfig {
    /// Recognition locale (e.g. "en-US")
    pub language: String,
    /// Keep listening after the first utterance
    pub continuous: bool,
    /// Deliver partial results
    pub interim_results: bool,
}

impl RecognizerConfig {
    /// Single-utterance, final-results-only config for a locale
    #[must_use]
    pub fn for_language(language: &str) -> Self {
        Self {
            language: language.to_string(),
            continuous: false,
            interim_results: false,
        }
    }
}

/// Platform speech-recognition capability
pub trait RecognitionPlatform {
    /// Whether the platform exposes a recognizer at all
    fn has_recognition(&self) -> bool;

    /// Platform user agent, used to rule out engines known to be broken
    fn user_agent(&self) -> &str;

    /// Create a recognizer instance; configuration is fixed for its lifetime
    fn create_recognizer(&self, config: &RecognizerConfig) -> Box<dyn PlatformRecognizer>;
}

/// A platform recognizer instance
pub trait PlatformRecognizer {
    /// Begin a recognition session
    ///
    /// # Errors
    ///
    /// Returns the platform's reason when a session cannot be started
    fn start(&mut self) -> std::result::Result<(), String>;

    /// End the current session
    fn stop(&mut self);
}

/// One entry of a platform result list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionResult {
    /// Best alternative's transcript
    pub transcript: String,
    /// Whether the platform considers this result final
    pub is_final: bool,
}

impl RecognitionResult {
    /// A final result
    #[must_use]
    pub fn final_result(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: true,
        }
    }

    /// A partial result
    #[must_use]
    pub fn interim(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: false,
        }
    }
}

/// Events delivered by the platform recognizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// Audio capture began
    Start,
    /// Full result list for the session so far
    Result(Vec<RecognitionResult>),
    /// Session failed with the platform's error code (e.g. "no-speech")
    Error(String),
    /// Session ended
    End,
}

/// What handling an event changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionOutcome {
    /// Nothing observable changed
    Ignored,
    /// Listening began
    Started,
    /// A new transcript was captured
    Transcript(String),
    /// The session failed
    Failed,
    /// The session ended
    Ended,
}

/// Recognition state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognitionState {
    /// No session
    Idle,
    /// Start requested, waiting for the platform
    Starting,
    /// Capturing speech
    Listening,
}

type ResultCallback = Box<dyn FnMut(&str)>;

/// Speech recognition adapter
pub struct RecognitionAdapter {
    platform: Option<Box<dyn RecognitionPlatform>>,
    recognizer: Option<Box<dyn PlatformRecognizer>>,
    config: RecognizerConfig,
    state: RecognitionState,
    transcript: String,
    error: Option<String>,
    on_result: Option<ResultCallback>,
}

impl RecognitionAdapter {
    /// Create an adapter, probing the platform's capability
    ///
    /// Pass `None` when the environment has no speech stack at all.
    #[must_use]
    pub fn new(platform: Option<Box<dyn RecognitionPlatform>>, language: &str) -> Self {
        let config = RecognizerConfig::for_language(language);

        let unsupported = match platform.as_deref() {
            None => Some(NOT_SUPPORTED),
            Some(p) if !p.has_recognition() => Some(NOT_SUPPORTED),
            Some(p) if IOS_USER_AGENT.is_match(p.user_agent()) => Some(IOS_NOT_SUPPORTED),
            Some(_) => None,
        };

        if let Some(reason) = unsupported {
            tracing::warn!(reason, "speech recognition unavailable");
            return Self {
                platform: None,
                recognizer: None,
                config,
                state: RecognitionState::Idle,
                transcript: String::new(),
                error: Some(reason.to_string()),
                on_result: None,
            };
        }

        let recognizer = platform.as_deref().map(|p| p.create_recognizer(&config));
        tracing::debug!(language, "speech recognizer created");

        Self {
            platform,
            recognizer,
            config,
            state: RecognitionState::Idle,
            transcript: String::new(),
            error: None,
            on_result: None,
        }
    }

    /// Invoke `f` with every accepted transcript
    #[must_use]
    pub fn on_result(mut self, f: impl FnMut(&str) + 'static) -> Self {
        self.on_result = Some(Box::new(f));
        self
    }

    /// Whether the platform can recognize speech
    #[must_use]
    pub const fn is_supported(&self) -> bool {
        self.recognizer.is_some()
    }

    /// Start a session; a no-op when unsupported or already active
    pub fn start(&mut self) {
        let Some(recognizer) = self.recognizer.as_mut() else {
            tracing::debug!("start ignored, recognition unsupported");
            return;
        };

        if self.state != RecognitionState::Idle {
            tracing::debug!(state = ?self.state, "start ignored, session active");
            return;
        }

        self.error = None;
        match recognizer.start() {
            Ok(()) => {
                self.state = RecognitionState::Starting;
                tracing::debug!(language = %self.config.language, "speech recognition starting");
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to start speech recognition");
                self.error = Some(START_FAILED.to_string());
            }
        }
    }

    /// Stop the active session; a no-op when idle
    pub fn stop(&mut self) {
        if self.state == RecognitionState::Idle {
            return;
        }

        if let Some(recognizer) = self.recognizer.as_mut() {
            recognizer.stop();
        }
        self.state = RecognitionState::Idle;
        tracing::debug!("speech recognition stopped");
    }

    /// Clear the captured transcript without touching the session
    pub fn reset_transcript(&mut self) {
        self.transcript.clear();
    }

    /// Switch recognition locale
    ///
    /// The platform recognizer cannot be reconfigured mid-session, so any active
    /// session is stopped and a fresh recognizer is created.
    pub fn set_language(&mut self, language: &str) {
        if self.config.language == language {
            return;
        }

        self.stop();
        self.config = RecognizerConfig::for_language(language);

        if let Some(platform) = self.platform.as_deref() {
            self.recognizer = Some(platform.create_recognizer(&self.config));
            tracing::debug!(language, "speech recognizer recreated");
        }
    }

    /// Apply a platform event
    pub fn handle_event(&mut self, event: RecognitionEvent) -> RecognitionOutcome {
        match event {
            RecognitionEvent::Start => {
                if self.state == RecognitionState::Starting {
                    self.state = RecognitionState::Listening;
                    tracing::info!("speech recognition started");
                    RecognitionOutcome::Started
                } else {
                    RecognitionOutcome::Ignored
                }
            }
            RecognitionEvent::Result(results) => {
                let finals: Vec<&str> = results
                    .iter()
                    .filter(|r| r.is_final)
                    .map(|r| r.transcript.as_str())
                    .collect();

                if finals.is_empty() {
                    return RecognitionOutcome::Ignored;
                }

                self.transcript = finals.join(" ").trim().to_string();
                if let Some(cb) = self.on_result.as_mut() {
                    cb(&self.transcript);
                }
                RecognitionOutcome::Transcript(self.transcript.clone())
            }
            RecognitionEvent::Error(code) => {
                tracing::error!(code = %code, "speech recognition error");
                self.state = RecognitionState::Idle;
                self.error = Some(format!("Speech recognition error: {code}"));
                RecognitionOutcome::Failed
            }
            RecognitionEvent::End => {
                let was_active = self.state != RecognitionState::Idle;
                self.state = RecognitionState::Idle;
                tracing::info!(was_active, "speech recognition ended");
                RecognitionOutcome::Ended
            }
        }
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> RecognitionState {
        self.state
    }

    /// Whether speech is being captured
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.state == RecognitionState::Listening
    }

    /// Last accepted transcript
    #[must_use]
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// Current error, if any
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Active recognizer configuration
    #[must_use]
    pub const fn config(&self) -> &RecognizerConfig {
        &self.config
    }
}

impl Drop for RecognitionAdapter {
    fn drop(&mut self) {
        self.stop();
    }
}
