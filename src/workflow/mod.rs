pub mod test_session;

pub use test_session::{AdvanceOutcome, TestSession, TestSnapshot, TestState};
