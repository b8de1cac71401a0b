//! Tutoring turn driver: prompts the LLM, extracts the structured reply,
//! and renders the spoken form.

pub mod prompt;
pub mod session;

pub use prompt::StudentLevel;
pub use session::TutorSession;
