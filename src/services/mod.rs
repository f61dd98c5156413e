pub mod playback;
pub mod recording;
pub mod scorer;
pub mod selector;
pub mod speech;

pub use playback::PromptPlayer;
pub use recording::{RecordingCompleted, RecordingSession};
pub use scorer::{FixedJitter, JitterSource, ResponseScorer, ThreadRngJitter};
pub use selector::{mean_fluency, AdaptiveSelector, MAX_SEQUENCE_LEN};
pub use speech::{SpeechService, VoiceSettings};
