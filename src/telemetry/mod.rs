//! Telemetry: the wire protocol and both ends of the stream.
//!
//! The device encodes each gameplay event as a tag byte followed by a
//! fixed, type-specific little-endian payload and pushes the frame through
//! a bounded blocking queue onto the link. The host reads the stream back
//! under timeout-based framing and folds the decoded events into running
//! session statistics. There is no delimiter, length or checksum on the
//! wire; timeout policy is the only framing mechanism.

pub mod outbound;
pub mod receiver;
pub mod stats;
pub mod wire;
