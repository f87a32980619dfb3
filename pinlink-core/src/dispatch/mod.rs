//! Device-side link dispatcher
//!
//! The dispatcher owns the inbound byte stream. Bytes are assembled into
//! frames, valid requests are executed against the GPIO bank, and a reply
//! frame is produced for every completed frame:
//!
//! ```text
//! byte ─▶ FrameAssembler ─▶ Message ─▶ GpioBank ─▶ reply Message ─▶ UartTx
//!                │
//!                └─ rejected ─▶ FailureSignal (+ diagnostic frame)
//! ```
//!
//! Exactly one request is in flight at a time.

mod dispatcher;
mod stats;

pub use dispatcher::{Dispatcher, LinkError, MAX_REPLY_SIZE};
pub use stats::LinkStats;
