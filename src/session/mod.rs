//! Live audio session orchestration, state machine and transcript log.
mod constants;
pub mod events;
pub mod live_session;
pub mod session_state;
pub mod transcript_log;
pub use events::{SessionEvent, SessionNotice};
pub use live_session::{LiveSession, LiveSessionConfig};
pub use session_state::SessionState;
pub use transcript_log::{Role, TranscriptEntry, TranscriptLog};
