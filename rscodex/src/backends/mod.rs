/// Codex backend.
pub mod codex;
/// Gemini backend.
pub mod gemini;

pub use codex::CodexBackend;
pub use gemini::GeminiBackend;
