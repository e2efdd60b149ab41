//! Line-oriented wire grammar shared by both peers.

pub mod codec;
pub mod frame;

pub use codec::{FrameCodec, MAX_FRAME_BYTES};
pub use frame::Frame;
