//! Mixed-language speech pipeline: segmentation into language-tagged runs,
//! voice selection, and strictly sequential synthesis orchestration.

pub mod backend;
pub mod elevenlabs;
pub mod orchestrator;
pub mod segment;
pub mod voices;

pub use backend::{SpeechBackend, UtteranceRequest, VoiceInfo};
pub use orchestrator::{CompletionHook, SpeechOrchestrator};
pub use segment::segment;
