use std::time::{Duration, Instant};

use crate::error::{RenderError, RenderResult};

use super::{Fence, FrameSlot, SlotCapacity};

/// Frame ring configuration.
#[derive(Debug, Clone)]
pub struct FrameRingConfig {
    /// Number of frames the CPU may run ahead of the GPU.
    pub slot_count: usize,

    /// Upper bound on a slot wait. `None` waits forever.
    pub wait_timeout: Option<Duration>,
}

impl Default for FrameRingConfig {
    fn default() -> Self {
        Self {
            slot_count: 3,
            wait_timeout: Some(Duration::from_secs(10)),
        }
    }
}

/// Allocates strictly increasing fence values, starting at 1.
#[derive(Debug, Default, Clone)]
pub struct FenceCounter {
    last: u64,
}

impl FenceCounter {
    pub fn next_value(&mut self) -> u64 {
        self.last += 1;
        self.last
    }

    pub fn last(&self) -> u64 {
        self.last
    }
}

/// Fixed pool of frame slots reused round-robin behind a fence.
///
/// `acquire_next` is the only blocking call: it waits until the GPU has retired the
/// previous occupant of the next slot.
#[derive(Debug)]
pub struct FrameRing<F: Fence> {
    slots: Vec<FrameSlot>,
    current: usize,
    fence: F,
    last_issued: u64,
    wait_timeout: Option<Duration>,
}

impl<F: Fence> FrameRing<F> {
    pub fn new(config: &FrameRingConfig, capacity: SlotCapacity, fence: F) -> RenderResult<Self> {
        if config.slot_count == 0 {
            return Err(RenderError::config("frame ring needs at least one slot"));
        }

        let slots = (0..config.slot_count)
            .map(|_| FrameSlot::new(capacity))
            .collect();

        Ok(Self {
            slots,
            // The first acquire lands on slot 0.
            current: config.slot_count - 1,
            fence,
            last_issued: 0,
            wait_timeout: config.wait_timeout,
        })
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_slot(&self) -> &FrameSlot {
        &self.slots[self.current]
    }

    pub fn current_slot_mut(&mut self) -> &mut FrameSlot {
        &mut self.slots[self.current]
    }

    pub fn slot(&self, index: usize) -> Option<&FrameSlot> {
        self.slots.get(index)
    }

    pub fn slots(&self) -> &[FrameSlot] {
        &self.slots
    }

    pub fn fence(&self) -> &F {
        &self.fence
    }

    /// Highest fence value issued through `finish_frame`.
    pub fn last_issued(&self) -> u64 {
        self.last_issued
    }

    /// Blocks until the GPU is done with the next slot, then makes it current.
    ///
    /// Returns the index of the now-current slot. On error the ring stays on the
    /// previous slot.
    pub fn acquire_next(&mut self) -> RenderResult<usize> {
        let next = (self.current + 1) % self.slots.len();

        let value = self.slots[next].fence;
        if value != 0 && !self.fence.is_complete(value) {
            let started = Instant::now();
            self.fence.wait(value, self.wait_timeout)?;
            log::debug!(
                "slot {} waited {:?} for fence {}",
                next,
                started.elapsed(),
                value
            );
        }
        self.current = next;
        Ok(next)
    }

    /// Tags the current slot with `value` and signals it behind the submitted work.
    pub fn finish_frame(&mut self, value: u64) -> RenderResult<()> {
        if value <= self.last_issued {
            return Err(RenderError::FenceOrder {
                value,
                last: self.last_issued,
            });
        }

        self.slots[self.current].fence = value;
        self.last_issued = value;
        self.fence.signal(value)?;

        log::trace!("slot {} signalled fence {}", self.current, value);
        Ok(())
    }

    /// Waits for every issued fence value to retire.
    pub fn drain(&self) -> RenderResult<()> {
        if self.last_issued == 0 {
            return Ok(());
        }
        self.fence.wait(self.last_issued, self.wait_timeout)?;
        log::debug!("frame ring drained at fence {}", self.last_issued);
        Ok(())
    }
}
