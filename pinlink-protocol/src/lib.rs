//! pinlink serial GPIO protocol
//!
//! This crate defines the wire protocol spoken between a host and a
//! microcontroller that exposes its GPIO lines over a slow UART link.
//! Both roles use the same codec, so the frame layout is defined exactly once.
//!
//! # Protocol Overview
//!
//! Every request and every response is a single [`Message`] framed as:
//! ```text
//! ┌─────┬───────────────┬─────────────────────────┬──────────┬──────────┬─────┐
//! │ STX │ VER:3 │ PIN:5 │ IO:1 │ RW:1 │ LENGTH:6 │ DATA     │ CHECKSUM │ ETX │
//! │ 1B  │ 1B            │ 1B                      │ 0–63B    │ 1B       │ 1B  │
//! └─────┴───────────────┴─────────────────────────┴──────────┴──────────┴─────┘
//! ```
//!
//! The checksum is the modulo-256 sum of the *unpacked* header fields
//! followed by the data bytes. It catches line noise, not tampering.
//!
//! Receivers resynchronize by discarding everything up to the next start
//! marker; see [`FrameAssembler`].

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod assembler;
pub mod frame;
pub mod reply;

pub use assembler::FrameAssembler;
pub use frame::{
    FrameError, Io, Message, Rw, CMD_OFF, CMD_ON, END_MARKER, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE,
    PROTOCOL_VERSION, START_MARKER,
};
pub use reply::{Reply, STATUS_INVALID_DATA, STATUS_INVALID_PIN, STATUS_NO_DATA};
