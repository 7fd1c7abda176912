//! Application controller
//!
//! Binds the language registry, the translator and both speech adapters into
//! one interactive session. User-visible outcomes are emitted as [`Notice`]s
//! on an unbounded channel so any front end can render them.
//!
//! Translation is split in two so the controller is never borrowed across the
//! network call: [`Controller::begin_translate`] hands out a
//! [`PendingTranslation`] that runs on its own, and
//! [`Controller::finish_translate`] applies the result. Platform events and
//! other commands may be fed in between.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::languages;
use crate::speech::{
    RecognitionAdapter, RecognitionEvent, RecognitionOutcome, RecognitionPlatform,
    SynthesisAdapter, SynthesisEvent, SynthesisOutcome, SynthesisPlatform,
};
use crate::translation::Translator;
use crate::{Error, Result};

/// Default source language code
pub const DEFAULT_SOURCE_LANGUAGE: &str = "EN";

/// Default target language code
pub const DEFAULT_TARGET_LANGUAGE: &str = "ES";

/// Notice severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// Where an error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorSource {
    Recognition,
    Synthesis,
    Translation,
}

/// A user-visible notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub severity: Severity,
    /// Component that failed; `None` for informational and input notices
    pub source: Option<ErrorSource>,
}

impl Notice {
    fn info(title: &str, description: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            description: description.into(),
            severity: Severity::Info,
            source: None,
        }
    }

    fn error(title: &str, description: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            description: description.into(),
            severity: Severity::Error,
            source: None,
        }
    }

    fn with_source(mut self, source: ErrorSource) -> Self {
        self.source = Some(source);
        self
    }
}

/// Snapshot of the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub source_text: String,
    pub translated_text: String,
    pub source_language: String,
    pub target_language: String,
    pub is_translating: bool,
    pub is_listening: bool,
    pub is_speaking: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            source_text: String::new(),
            translated_text: String::new(),
            source_language: DEFAULT_SOURCE_LANGUAGE.to_string(),
            target_language: DEFAULT_TARGET_LANGUAGE.to_string(),
            is_translating: false,
            is_listening: false,
            is_speaking: false,
        }
    }
}

/// Whether each source's current error condition has been surfaced
#[derive(Debug, Default)]
struct ErrorLatch {
    recognition: bool,
    synthesis: bool,
}

/// A translation detached from the controller while it runs
pub struct PendingTranslation {
    id: u64,
    text: String,
    target_lang: String,
    translator: Arc<dyn Translator>,
}

impl PendingTranslation {
    /// Text captured when the translation began
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Target language captured when the translation began
    #[must_use]
    pub fn target_lang(&self) -> &str {
        &self.target_lang
    }

    /// Call the translator
    pub async fn run(self) -> CompletedTranslation {
        let result = self.translator.translate(&self.text, &self.target_lang).await;
        CompletedTranslation {
            id: self.id,
            result,
        }
    }
}

/// Translator result waiting to be applied with [`Controller::finish_translate`]
#[derive(Debug)]
pub struct CompletedTranslation {
    id: u64,
    result: Result<String>,
}

/// Builder for a [`Controller`]
pub struct ControllerBuilder {
    translator: Arc<dyn Translator>,
    recognition: Option<Box<dyn RecognitionPlatform>>,
    synthesis: Option<Box<dyn SynthesisPlatform>>,
    source_language: String,
    target_language: String,
}

impl ControllerBuilder {
    /// Start from a translator; speech platforms default to absent
    #[must_use]
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self {
            translator,
            recognition: None,
            synthesis: None,
            source_language: DEFAULT_SOURCE_LANGUAGE.to_string(),
            target_language: DEFAULT_TARGET_LANGUAGE.to_string(),
        }
    }

    /// Use a platform speech recognizer
    #[must_use]
    pub fn recognition(mut self, platform: Box<dyn RecognitionPlatform>) -> Self {
        self.recognition = Some(platform);
        self
    }

    /// Use a platform speech synthesizer
    #[must_use]
    pub fn synthesis(mut self, platform: Box<dyn SynthesisPlatform>) -> Self {
        self.synthesis = Some(platform);
        self
    }

    /// Initial language pair
    #[must_use]
    pub fn languages(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.source_language = source.into();
        self.target_language = target.into();
        self
    }

    /// Build the controller and the receiving end of its notice channel
    #[must_use]
    pub fn build(self) -> (Controller, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();

        let recognition = RecognitionAdapter::new(
            self.recognition,
            languages::speech_locale(&self.source_language),
        );

        let on_end = tx.clone();
        let on_error = tx.clone();
        let synthesis = SynthesisAdapter::new(self.synthesis)
            .on_end(move || {
                let _ = on_end.send(Notice::info(
                    "Playback complete",
                    "The translation has been spoken.",
                ));
            })
            .on_error(move |_| {
                let notice = Notice::error(
                    "Playback error",
                    "There was an error playing the translation.",
                );
                let _ = on_error.send(notice.with_source(ErrorSource::Synthesis));
            });

        let state = SessionState {
            source_language: self.source_language,
            target_language: self.target_language,
            ..SessionState::default()
        };

        let mut controller = Controller {
            state,
            translator: self.translator,
            recognition,
            synthesis,
            latch: ErrorLatch::default(),
            translations_started: 0,
            in_flight: None,
            notices: tx,
        };
        controller.sync_errors();

        (controller, rx)
    }
}

/// Interactive translation session
pub struct Controller {
    state: SessionState,
    translator: Arc<dyn Translator>,
    recognition: RecognitionAdapter,
    synthesis: SynthesisAdapter,
    latch: ErrorLatch,
    translations_started: u64,
    in_flight: Option<u64>,
    notices: mpsc::UnboundedSender<Notice>,
}

impl Controller {
    /// Build a controller with default languages and no speech platforms
    #[must_use]
    pub fn new(translator: Arc<dyn Translator>) -> (Self, mpsc::UnboundedReceiver<Notice>) {
        ControllerBuilder::new(translator).build()
    }

    /// Current session snapshot
    #[must_use]
    pub fn state(&self) -> SessionState {
        SessionState {
            is_listening: self.recognition.is_listening(),
            is_speaking: self.synthesis.is_speaking(),
            ..self.state.clone()
        }
    }

    /// Replace the source text (typed input)
    pub fn set_source_text(&mut self, text: impl Into<String>) {
        self.state.source_text = text.into();
    }

    /// Change the source language and reconfigure the recognizer
    pub fn set_source_language(&mut self, code: &str) {
        tracing::debug!(code, "source language changed");
        self.state.source_language = code.to_string();
        self.recognition.set_language(languages::speech_locale(code));
        self.sync_errors();
    }

    /// Change the target language
    pub fn set_target_language(&mut self, code: &str) {
        tracing::debug!(code, "target language changed");
        self.state.target_language = code.to_string();
    }

    /// Begin capturing speech
    pub fn start_listening(&mut self) {
        self.recognition.start();
        self.sync_errors();
    }

    /// Stop capturing speech
    pub fn stop_listening(&mut self) {
        self.recognition.stop();
        self.sync_errors();
    }

    /// Start or stop capturing depending on the current state
    pub fn toggle_listening(&mut self) {
        if self.recognition.is_listening() {
            self.stop_listening();
        } else {
            self.start_listening();
        }
    }

    /// Clear the source text and the captured transcript
    pub fn clear_source(&mut self) {
        self.state.source_text.clear();
        self.recognition.reset_transcript();
    }

    /// Start translating the source text into the target language
    ///
    /// Marks the session as translating. The returned request owns everything
    /// it needs, so the controller stays free while it runs.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` when there is nothing to translate; an
    /// "Empty text" notice has already been emitted.
    pub fn begin_translate(&mut self) -> Result<PendingTranslation> {
        if self.state.source_text.trim().is_empty() {
            self.notify(Notice::error(
                "Empty text",
                "Please enter or speak some text to translate.",
            ));
            return Err(Error::Validation("source text is empty".to_string()));
        }

        self.translations_started += 1;
        let id = self.translations_started;
        self.in_flight = Some(id);
        self.state.is_translating = true;

        let pending = PendingTranslation {
            id,
            text: self.state.source_text.clone(),
            target_lang: self.state.target_language.clone(),
            translator: self.translator.clone(),
        };
        tracing::debug!(
            id,
            target = %pending.target_lang,
            chars = pending.text.len(),
            "translating"
        );

        Ok(pending)
    }

    /// Apply a finished translation
    ///
    /// Only the most recently begun translation updates the session; a
    /// superseded or canceled one is returned untouched.
    ///
    /// # Errors
    ///
    /// Returns the translator's error after emitting a "Translation failed"
    /// notice; the previous translation is kept.
    pub fn finish_translate(&mut self, completed: CompletedTranslation) -> Result<String> {
        if self.in_flight != Some(completed.id) {
            tracing::debug!(id = completed.id, "stale translation ignored");
            return completed.result;
        }

        self.in_flight = None;
        self.state.is_translating = false;

        match completed.result {
            Ok(translated) => {
                self.state.translated_text.clone_from(&translated);
                self.notify(Notice::info(
                    "Translation complete",
                    "Your text has been translated successfully.",
                ));
                Ok(translated)
            }
            Err(e) => {
                tracing::warn!(error = %e, "translation failed");
                let notice = Notice::error("Translation failed", e.to_string());
                self.notify(notice.with_source(ErrorSource::Translation));
                Err(e)
            }
        }
    }

    /// Abandon the translation in flight; its result will be ignored
    pub fn cancel_translation(&mut self) {
        if let Some(id) = self.in_flight.take() {
            tracing::debug!(id, "translation canceled");
        }
        self.state.is_translating = false;
    }

    /// Translate and apply the result in one step
    ///
    /// Holds the controller for the whole call; front ends that keep feeding
    /// events meanwhile use [`Self::begin_translate`] and
    /// [`Self::finish_translate`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::begin_translate`] and [`Self::finish_translate`]
    pub async fn translate(&mut self) -> Result<String> {
        let pending = self.begin_translate()?;
        let completed = pending.run().await;
        self.finish_translate(completed)
    }

    /// Speak the translated text in the target language
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` when there is no translation to speak,
    /// `Error::Unsupported` without a synthesizer and `Error::Platform` when
    /// the synthesizer refuses the utterance
    pub fn speak(&mut self) -> Result<()> {
        if self.state.translated_text.trim().is_empty() {
            self.notify(Notice::error(
                "Empty translation",
                "Please translate some text first.",
            ));
            return Err(Error::Validation("translated text is empty".to_string()));
        }

        // Each attempt clears the synthesizer's runtime error
        if self.synthesis.is_supported() {
            self.latch.synthesis = false;
        }

        let locale = languages::speech_locale(&self.state.target_language);
        self.synthesis.speak(&self.state.translated_text, locale);
        self.sync_errors();

        match self.synthesis.error() {
            None => Ok(()),
            Some(e) if !self.synthesis.is_supported() => Err(Error::Unsupported(e.to_string())),
            Some(e) => Err(Error::Platform(e.to_string())),
        }
    }

    /// Clear both texts and stop all speech activity
    pub fn reset(&mut self) {
        self.state.source_text.clear();
        self.state.translated_text.clear();
        self.recognition.reset_transcript();
        self.recognition.stop();
        self.synthesis.cancel();
        self.sync_errors();
    }

    /// Feed a platform recognition event
    pub fn handle_recognition_event(&mut self, event: RecognitionEvent) -> RecognitionOutcome {
        let outcome = self.recognition.handle_event(event);
        if let RecognitionOutcome::Transcript(text) = &outcome {
            if *text != self.state.source_text {
                self.state.source_text.clone_from(text);
            }
        }
        self.sync_errors();
        outcome
    }

    /// Feed a platform synthesis event
    pub fn handle_synthesis_event(&mut self, event: SynthesisEvent) -> SynthesisOutcome {
        let outcome = self.synthesis.handle_event(event);
        self.sync_errors();
        outcome
    }

    /// Whether speech capture is available
    #[must_use]
    pub const fn recognition_supported(&self) -> bool {
        self.recognition.is_supported()
    }

    /// Whether speech output is available
    #[must_use]
    pub const fn synthesis_supported(&self) -> bool {
        self.synthesis.is_supported()
    }

    /// Surface each source's error once per continuous error condition
    fn sync_errors(&mut self) {
        if let Some(notice) = latch(
            &mut self.latch.recognition,
            self.recognition.error(),
            ErrorSource::Recognition,
        ) {
            self.notify(notice);
        }

        if let Some(notice) = latch(
            &mut self.latch.synthesis,
            self.synthesis.error(),
            ErrorSource::Synthesis,
        ) {
            self.notify(notice);
        }
    }

    fn notify(&self, notice: Notice) {
        tracing::debug!(
            title = %notice.title,
            severity = ?notice.severity,
            source = ?notice.source,
            "notice"
        );
        if self.notices.send(notice).is_err() {
            tracing::trace!("notice receiver dropped");
        }
    }
}

fn latch(shown: &mut bool, current: Option<&str>, source: ErrorSource) -> Option<Notice> {
    let Some(message) = current else {
        *shown = false;
        return None;
    };

    if *shown {
        return None;
    }

    *shown = true;
    let title = match source {
        ErrorSource::Recognition => "Speech recognition error",
        ErrorSource::Synthesis => "Speech synthesis error",
        ErrorSource::Translation => "Translation failed",
    };
    Some(Notice::error(title, message).with_source(source))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::speech::recognition::{self, PlatformRecognizer, RecognitionResult, RecognizerConfig};
    use crate::speech::synthesis::{self, Utterance, UtteranceId, Voice};

    struct FakeTranslator {
        calls: Arc<AtomicUsize>,
        reply: std::result::Result<String, String>,
    }

    #[async_trait]
    impl Translator for FakeTranslator {
        async fn translate(&self, text: &str, target_lang: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(prefix) => Ok(format!("{prefix}:{target_lang}:{text}")),
                Err(message) => Err(Error::Upstream {
                    status: 403,
                    message: message.clone(),
                }),
            }
        }
    }

    fn translator(
        reply: std::result::Result<&str, &str>,
    ) -> (Arc<dyn Translator>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let fake = FakeTranslator {
            calls: calls.clone(),
            reply: reply.map(str::to_string).map_err(str::to_string),
        };
        (Arc::new(fake), calls)
    }

    #[derive(Default)]
    struct RecognizerLog {
        created: Vec<String>,
        stops: usize,
    }

    struct FakeRecognitionPlatform(Rc<RefCell<RecognizerLog>>);
    struct FakeRecognizer(Rc<RefCell<RecognizerLog>>);

    impl RecognitionPlatform for FakeRecognitionPlatform {
        fn has_recognition(&self) -> bool {
            true
        }

        fn user_agent(&self) -> &str {
            "Mozilla/5.0 (X11; Linux x86_64)"
        }

        fn create_recognizer(&self, config: &RecognizerConfig) -> Box<dyn PlatformRecognizer> {
            self.0.borrow_mut().created.push(config.language.clone());
            Box::new(FakeRecognizer(self.0.clone()))
        }
    }

    impl PlatformRecognizer for FakeRecognizer {
        fn start(&mut self) -> std::result::Result<(), String> {
            Ok(())
        }

        fn stop(&mut self) {
            self.0.borrow_mut().stops += 1;
        }
    }

    #[derive(Default)]
    struct SynthLog {
        spoken: Vec<Utterance>,
        cancels: usize,
        refuse: bool,
    }

    struct FakeSynth(Rc<RefCell<SynthLog>>);

    impl SynthesisPlatform for FakeSynth {
        fn voices(&self) -> Vec<Voice> {
            vec![Voice {
                name: "Monica".to_string(),
                lang: "es-ES".to_string(),
            }]
        }

        fn speak(&mut self, utterance: Utterance) -> std::result::Result<UtteranceId, String> {
            let mut log = self.0.borrow_mut();
            if log.refuse {
                return Err("synthesis-unavailable".to_string());
            }
            log.spoken.push(utterance);
            Ok(UtteranceId(log.spoken.len() as u64))
        }

        fn cancel(&mut self) {
            self.0.borrow_mut().cancels += 1;
        }
    }

    struct Harness {
        controller: Controller,
        notices: mpsc::UnboundedReceiver<Notice>,
        calls: Arc<AtomicUsize>,
        recognizer: Rc<RefCell<RecognizerLog>>,
        synth: Rc<RefCell<SynthLog>>,
    }

    impl Harness {
        fn drain(&mut self) -> Vec<Notice> {
            std::iter::from_fn(|| self.notices.try_recv().ok()).collect()
        }

        fn titles(&mut self) -> Vec<String> {
            self.drain().into_iter().map(|n| n.title).collect()
        }
    }

    fn harness(reply: std::result::Result<&str, &str>) -> Harness {
        let (translator, calls) = translator(reply);
        let recognizer = Rc::new(RefCell::new(RecognizerLog::default()));
        let synth = Rc::new(RefCell::new(SynthLog::default()));
        let (controller, notices) = ControllerBuilder::new(translator)
            .recognition(Box::new(FakeRecognitionPlatform(recognizer.clone())))
            .synthesis(Box::new(FakeSynth(synth.clone())))
            .build();
        Harness {
            controller,
            notices,
            calls,
            recognizer,
            synth,
        }
    }

    fn recognition_error(code: &str) -> RecognitionEvent {
        RecognitionEvent::Error(code.to_string())
    }

    #[test]
    fn defaults_to_english_to_spanish() {
        let h = harness(Ok("t"));
        let state = h.controller.state();
        assert_eq!(state.source_language, "EN");
        assert_eq!(state.target_language, "ES");
        assert!(!state.is_translating);
        assert_eq!(h.recognizer.borrow().created, vec!["en-US".to_string()]);
    }

    #[tokio::test]
    async fn empty_source_is_rejected_without_network() {
        let mut h = harness(Ok("t"));
        h.controller.set_source_text("   ");

        let err = h.controller.translate().await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(h.calls.load(Ordering::SeqCst), 0);
        assert!(!h.controller.state().is_translating);
        assert_eq!(h.titles(), vec!["Empty text".to_string()]);
    }

    #[tokio::test]
    async fn successful_translation_updates_state() {
        let mut h = harness(Ok("es"));
        h.controller.set_source_text("Hello");

        let translated = h.controller.translate().await.unwrap();
        assert_eq!(translated, "es:ES:Hello");

        let state = h.controller.state();
        assert_eq!(state.translated_text, "es:ES:Hello");
        assert!(!state.is_translating);
        assert_eq!(h.titles(), vec!["Translation complete".to_string()]);
    }

    #[tokio::test]
    async fn failed_translation_keeps_previous_text() {
        let mut h = harness(Err("DeepL API error: quota exceeded"));
        h.controller.state.translated_text = "Hola".to_string();
        h.controller.set_source_text("Hello");

        assert!(h.controller.translate().await.is_err());
        assert_eq!(h.controller.state().translated_text, "Hola");
        assert!(!h.controller.state().is_translating);

        let notice = h.notices.try_recv().unwrap();
        assert_eq!(notice.title, "Translation failed");
        assert_eq!(notice.description, "DeepL API error: quota exceeded");
        assert_eq!(notice.severity, Severity::Error);
        assert_eq!(notice.source, Some(ErrorSource::Translation));
    }

    #[tokio::test]
    async fn translation_uses_current_target() {
        let mut h = harness(Ok("x"));
        h.controller.set_target_language("FR");
        h.controller.set_source_text("Hello");
        assert_eq!(h.controller.translate().await.unwrap(), "x:FR:Hello");
    }

    #[tokio::test]
    async fn events_apply_while_translation_pending() {
        let mut h = harness(Ok("t"));
        h.controller.set_source_text("Hello");

        let pending = h.controller.begin_translate().unwrap();
        assert!(h.controller.state().is_translating);
        assert_eq!(pending.text(), "Hello");
        assert_eq!(pending.target_lang(), "ES");

        // Speech keeps flowing while the request is out
        h.controller.start_listening();
        h.controller.handle_recognition_event(RecognitionEvent::Start);
        h.controller.handle_recognition_event(RecognitionEvent::Result(vec![
            RecognitionResult::final_result("good morning"),
        ]));
        assert!(h.controller.state().is_listening);
        assert_eq!(h.controller.state().source_text, "good morning");
        assert!(h.controller.state().is_translating);

        let completed = pending.run().await;
        assert_eq!(h.controller.finish_translate(completed).unwrap(), "t:ES:Hello");

        let state = h.controller.state();
        assert!(!state.is_translating);
        assert_eq!(state.translated_text, "t:ES:Hello");
        assert_eq!(state.source_text, "good morning");
    }

    #[tokio::test]
    async fn superseded_translation_is_not_applied() {
        let mut h = harness(Ok("t"));
        h.controller.set_source_text("first");
        let first = h.controller.begin_translate().unwrap();
        h.controller.set_source_text("second");
        let second = h.controller.begin_translate().unwrap();

        let first = first.run().await;
        assert_eq!(h.controller.finish_translate(first).unwrap(), "t:ES:first");
        assert!(h.controller.state().translated_text.is_empty());
        assert!(h.controller.state().is_translating);
        assert!(h.titles().is_empty());

        let second = second.run().await;
        h.controller.finish_translate(second).unwrap();
        assert_eq!(h.controller.state().translated_text, "t:ES:second");
        assert!(!h.controller.state().is_translating);
        assert_eq!(h.titles(), vec!["Translation complete".to_string()]);
    }

    #[tokio::test]
    async fn canceled_translation_clears_flag_and_is_ignored() {
        let mut h = harness(Ok("t"));
        h.controller.set_source_text("Hello");
        let pending = h.controller.begin_translate().unwrap();

        h.controller.cancel_translation();
        assert!(!h.controller.state().is_translating);

        let completed = pending.run().await;
        assert!(h.controller.finish_translate(completed).is_ok());
        assert!(h.controller.state().translated_text.is_empty());
        assert!(h.titles().is_empty());
    }

    #[test]
    fn speak_without_translation_is_rejected() {
        let mut h = harness(Ok("t"));
        assert!(matches!(h.controller.speak(), Err(Error::Validation(_))));
        assert!(h.synth.borrow().spoken.is_empty());

        let notices = h.drain();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].title, "Empty translation");
        assert_eq!(notices[0].source, None);
    }

    #[test]
    fn speak_uses_target_locale_and_reports_completion() {
        let mut h = harness(Ok("t"));
        h.controller.state.translated_text = "Hola".to_string();

        h.controller.speak().unwrap();
        let id = {
            let synth = h.synth.borrow();
            assert_eq!(synth.spoken[0].lang, "es-ES");
            UtteranceId(synth.spoken.len() as u64)
        };

        h.controller.handle_synthesis_event(SynthesisEvent::Start(id));
        assert!(h.controller.state().is_speaking);

        assert_eq!(
            h.controller.handle_synthesis_event(SynthesisEvent::End(id)),
            SynthesisOutcome::Finished
        );
        assert!(!h.controller.state().is_speaking);
        assert_eq!(h.titles(), vec!["Playback complete".to_string()]);
    }

    #[test]
    fn synthesis_failure_notices_once() {
        let mut h = harness(Ok("t"));
        h.controller.state.translated_text = "Hola".to_string();
        h.controller.speak().unwrap();

        let failed = || SynthesisEvent::Error(UtteranceId(1), "audio-busy".to_string());
        h.controller.handle_synthesis_event(failed());
        // Late duplicate from the platform
        h.controller.handle_synthesis_event(failed());

        let notices = h.drain();
        let titles: Vec<&str> = notices.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["Playback error", "Speech synthesis error"]);
        assert!(notices.iter().all(|n| n.source == Some(ErrorSource::Synthesis)));
    }

    #[test]
    fn refused_utterance_is_reported_on_every_attempt() {
        let mut h = harness(Ok("t"));
        h.synth.borrow_mut().refuse = true;
        h.controller.state.translated_text = "Hola".to_string();

        assert!(matches!(h.controller.speak(), Err(Error::Platform(_))));
        assert!(matches!(h.controller.speak(), Err(Error::Platform(_))));

        assert_eq!(
            h.titles(),
            vec![
                "Playback error".to_string(),
                "Speech synthesis error".to_string(),
                "Playback error".to_string(),
                "Speech synthesis error".to_string(),
            ]
        );
    }

    #[test]
    fn recognized_text_becomes_source_text() {
        let mut h = harness(Ok("t"));
        h.controller.start_listening();
        h.controller.handle_recognition_event(RecognitionEvent::Start);
        assert!(h.controller.state().is_listening);

        h.controller.handle_recognition_event(RecognitionEvent::Result(vec![
            RecognitionResult::final_result("good morning"),
        ]));
        assert_eq!(h.controller.state().source_text, "good morning");

        h.controller.handle_recognition_event(RecognitionEvent::End);
        assert!(!h.controller.state().is_listening);
    }

    #[test]
    fn toggle_listening_flips_session() {
        let mut h = harness(Ok("t"));
        h.controller.toggle_listening();
        h.controller.handle_recognition_event(RecognitionEvent::Start);
        assert!(h.controller.state().is_listening);

        h.controller.toggle_listening();
        assert!(!h.controller.state().is_listening);
        assert_eq!(h.recognizer.borrow().stops, 1);
    }

    #[test]
    fn source_language_change_recreates_recognizer() {
        let mut h = harness(Ok("t"));
        h.controller.set_source_language("FR");
        assert_eq!(h.controller.state().source_language, "FR");
        assert_eq!(
            h.recognizer.borrow().created,
            vec!["en-US".to_string(), "fr-FR".to_string()]
        );
    }

    #[test]
    fn recognition_error_reported_once_per_condition() {
        let mut h = harness(Ok("t"));

        h.controller.start_listening();
        h.controller.handle_recognition_event(recognition_error("no-speech"));
        h.controller.handle_recognition_event(recognition_error("no-speech"));
        // A different code while the first is still set is the same condition
        h.controller.handle_recognition_event(recognition_error("aborted"));
        h.controller.handle_recognition_event(RecognitionEvent::End);

        let notices = h.drain();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].title, "Speech recognition error");
        assert_eq!(notices[0].description, "Speech recognition error: no-speech");
        assert_eq!(notices[0].source, Some(ErrorSource::Recognition));

        // A fresh start clears the error and rearms the latch
        h.controller.start_listening();
        assert!(h.titles().is_empty());
        h.controller.handle_recognition_event(recognition_error("network"));
        assert_eq!(h.titles(), vec!["Speech recognition error".to_string()]);
    }

    #[test]
    fn clear_source_keeps_translation() {
        let mut h = harness(Ok("t"));
        h.controller.set_source_text("Hello");
        h.controller.state.translated_text = "Hola".to_string();

        h.controller.clear_source();
        let state = h.controller.state();
        assert!(state.source_text.is_empty());
        assert_eq!(state.translated_text, "Hola");
    }

    #[test]
    fn reset_clears_everything_and_stops_speech() {
        let mut h = harness(Ok("t"));
        h.controller.set_source_text("Hello");
        h.controller.state.translated_text = "Hola".to_string();
        h.controller.start_listening();
        h.controller.handle_recognition_event(RecognitionEvent::Start);
        h.controller.speak().unwrap();

        h.controller.reset();

        let state = h.controller.state();
        assert!(state.source_text.is_empty());
        assert!(state.translated_text.is_empty());
        assert!(!state.is_listening);
        assert!(!state.is_speaking);
        assert_eq!(h.recognizer.borrow().stops, 1);
        // One cancel before speaking, one on reset
        assert_eq!(h.synth.borrow().cancels, 2);
    }

    #[test]
    fn missing_speech_platforms_report_once() {
        let (translator, _calls) = translator(Ok("t"));
        let (mut controller, mut notices) = Controller::new(translator);
        assert!(!controller.recognition_supported());
        assert!(!controller.synthesis_supported());

        let first = notices.try_recv().unwrap();
        assert_eq!(first.title, "Speech recognition error");
        assert_eq!(first.description, recognition::NOT_SUPPORTED);

        controller.start_listening();
        controller.state.translated_text = "Hola".to_string();
        assert!(matches!(controller.speak(), Err(Error::Unsupported(_))));
        assert!(matches!(controller.speak(), Err(Error::Unsupported(_))));

        let titles: Vec<String> = std::iter::from_fn(|| notices.try_recv().ok())
            .map(|n| n.title)
            .collect();
        assert_eq!(
            titles,
            vec![
                "Playback error".to_string(),
                "Speech synthesis error".to_string(),
                "Playback error".to_string(),
            ]
        );
        assert_eq!(controller.synthesis.error(), Some(synthesis::NOT_SUPPORTED));
    }
}
