//! Frame-resource ring.
//!
//! A fixed pool of per-frame upload buffers, rotated round-robin. Each slot carries the
//! fence value of the last frame that used it; acquiring a slot waits for that value so
//! the CPU never overwrites data the GPU may still read.

mod fence;
mod ring;
mod slot;
mod upload;

pub use fence::{CpuFence, Fence, FenceCompleter, QueueFence};
pub use ring::{FenceCounter, FrameRing, FrameRingConfig};
pub use slot::{FrameSlot, SlotCapacity};
pub use upload::{constant_buffer_byte_size, UploadBuffer, CONSTANT_BUFFER_ALIGNMENT};
