pub mod audio;
pub mod capture;
pub mod simulated;

pub use audio::AudioSink;
pub use capture::{AudioArtifact, CaptureRecorder, CaptureStream, MicrophoneCapture};
pub use simulated::{NullSink, SimulatedMicrophone};
