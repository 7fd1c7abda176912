//! Speech adapters over platform recognition and synthesis engines
//!
//! The adapters own the state machines; the platform traits are thin seams
//! an embedder implements for its actual engine.

pub mod recognition;
pub mod synthesis;

pub use recognition::{
    PlatformRecognizer, RecognitionAdapter, RecognitionEvent, RecognitionOutcome,
    RecognitionPlatform, RecognitionResult, RecognitionState, RecognizerConfig,
};
pub use synthesis::{
    SynthesisAdapter, SynthesisEvent, SynthesisOutcome, SynthesisPlatform, Utterance,
    UtteranceId, Voice,
};
