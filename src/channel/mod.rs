//! Bidirectional streaming channel to the translation engine.
//!
//! The engine itself is an external collaborator: this module defines only
//! the seam — what a connected channel accepts outbound and the named events
//! it emits inbound. Concrete transports implement [`ChannelConnector`] and
//! [`SessionChannel`].
pub mod channel_error;
pub mod channel_event;
pub mod session_channel;
pub use channel_error::ChannelError;
pub use channel_event::ChannelEvent;
pub use session_channel::{ChannelConnector, ChannelResult, SessionChannel};
