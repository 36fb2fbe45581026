pub mod console;
pub mod transcript;

pub use transcript::{RecordingTranscript, TranscriptView};
