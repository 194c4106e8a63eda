use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::error::{RenderError, RenderResult};

/// A monotonic GPU timeline marker.
///
/// `signal(v)` enqueues a marker behind all work submitted so far; once that work
/// retires, `completed_value()` reaches `v`. Values are issued strictly increasing by
/// the caller.
pub trait Fence {
    /// Highest value known to have completed.
    fn completed_value(&self) -> u64;

    /// Enqueues `value` behind all previously submitted work.
    fn signal(&self, value: u64) -> RenderResult<()>;

    /// Blocks until `completed_value() >= value`.
    ///
    /// `None` waits forever; otherwise fails with `SynchronizationTimeout`.
    fn wait(&self, value: u64, timeout: Option<Duration>) -> RenderResult<()>;

    fn is_complete(&self, value: u64) -> bool {
        self.completed_value() >= value
    }
}

fn timeout_error(value: u64, completed: u64, started: Instant) -> RenderError {
    RenderError::SynchronizationTimeout {
        value,
        completed,
        waited: started.elapsed(),
    }
}

// ── QueueFence ────────────────────────────────────────────────────────────

/// Fence driven by wgpu queue completion callbacks.
///
/// Waiting polls the device so callbacks run on the calling thread.
#[derive(Debug, Clone)]
pub struct QueueFence {
    device: wgpu::Device,
    queue: wgpu::Queue,
    completed: Arc<AtomicU64>,
}

impl QueueFence {
    const POLL_BACKOFF: Duration = Duration::from_micros(250);

    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            device,
            queue,
            completed: Arc::new(AtomicU64::new(0)),
        }
    }

    fn poll(&self) -> RenderResult<()> {
        self.device
            .poll(wgpu::PollType::Poll)
            .map(|_| ())
            .map_err(|e| RenderError::Device(e.to_string()))
    }
}

impl Fence for QueueFence {
    fn completed_value(&self) -> u64 {
        self.completed.load(Ordering::Acquire)
    }

    fn signal(&self, value: u64) -> RenderResult<()> {
        let completed = Arc::clone(&self.completed);
        self.queue.on_submitted_work_done(move || {
            completed.fetch_max(value, Ordering::AcqRel);
        });
        Ok(())
    }

    fn wait(&self, value: u64, timeout: Option<Duration>) -> RenderResult<()> {
        let started = Instant::now();
        loop {
            if self.is_complete(value) {
                return Ok(());
            }
            self.poll()?;
            if self.is_complete(value) {
                return Ok(());
            }
            if timeout.is_some_and(|t| started.elapsed() >= t) {
                return Err(timeout_error(value, self.completed_value(), started));
            }
            std::thread::sleep(Self::POLL_BACKOFF);
        }
    }
}

// ── CpuFence ──────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct CpuTimeline {
    completed: u64,
    pending: VecDeque<u64>,
    auto_complete: bool,
}

#[derive(Debug, Default)]
struct Shared {
    timeline: Mutex<CpuTimeline>,
    retired: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, CpuTimeline> {
        // Timeline updates are single assignments; a poisoned guard is still consistent.
        self.timeline.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Software fence for headless runs and tests.
///
/// Signalled values queue up until a `FenceCompleter` retires them, standing in for a
/// GPU that finishes work asynchronously.
#[derive(Debug, Clone, Default)]
pub struct CpuFence {
    shared: Arc<Shared>,
}

impl CpuFence {
    /// A fence whose signals stay pending until completed explicitly.
    pub fn new() -> Self {
        Self::default()
    }

    /// A fence that retires every value as soon as it is signalled.
    pub fn immediate() -> Self {
        let fence = Self::default();
        fence.shared.lock().auto_complete = true;
        fence
    }

    pub fn completer(&self) -> FenceCompleter {
        FenceCompleter {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Signalled values not yet retired, oldest first.
    pub fn pending(&self) -> Vec<u64> {
        self.shared.lock().pending.iter().copied().collect()
    }
}

impl Fence for CpuFence {
    fn completed_value(&self) -> u64 {
        self.shared.lock().completed
    }

    fn signal(&self, value: u64) -> RenderResult<()> {
        let mut t = self.shared.lock();
        if t.auto_complete {
            t.completed = t.completed.max(value);
            self.shared.retired.notify_all();
        } else {
            t.pending.push_back(value);
        }
        Ok(())
    }

    fn wait(&self, value: u64, timeout: Option<Duration>) -> RenderResult<()> {
        let started = Instant::now();
        let mut t = self.shared.lock();

        while t.completed < value {
            match timeout {
                None => {
                    t = self
                        .shared
                        .retired
                        .wait(t)
                        .unwrap_or_else(|e| e.into_inner());
                }
                Some(limit) => {
                    let remaining = limit.saturating_sub(started.elapsed());
                    if remaining.is_zero() {
                        return Err(timeout_error(value, t.completed, started));
                    }
                    t = self
                        .shared
                        .retired
                        .wait_timeout(t, remaining)
                        .map(|(guard, _)| guard)
                        .unwrap_or_else(|e| e.into_inner().0);
                }
            }
        }
        Ok(())
    }
}

/// Retires values signalled on a `CpuFence`, possibly from another thread.
#[derive(Debug, Clone)]
pub struct FenceCompleter {
    shared: Arc<Shared>,
}

impl FenceCompleter {
    /// Retires the oldest pending value. Returns it, or `None` if nothing is pending.
    pub fn complete_next(&self) -> Option<u64> {
        let mut t = self.shared.lock();
        let value = t.pending.pop_front()?;
        t.completed = t.completed.max(value);
        self.shared.retired.notify_all();
        Some(value)
    }

    /// Retires every pending value up to and including `value`.
    pub fn complete_through(&self, value: u64) {
        let mut t = self.shared.lock();
        while t.pending.front().is_some_and(|&v| v <= value) {
            t.pending.pop_front();
        }
        t.completed = t.completed.max(value);
        self.shared.retired.notify_all();
    }

    /// Retires everything signalled so far.
    pub fn complete_all(&self) {
        let mut t = self.shared.lock();
        if let Some(last) = t.pending.drain(..).last() {
            t.completed = t.completed.max(last);
        }
        self.shared.retired.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_always_complete() {
        let f = CpuFence::new();
        assert!(f.is_complete(0));
        f.wait(0, Some(Duration::ZERO)).unwrap();
    }

    #[test]
    fn signal_stays_pending_until_completed() {
        let f = CpuFence::new();
        f.signal(1).unwrap();
        f.signal(2).unwrap();
        assert_eq!(f.completed_value(), 0);
        assert_eq!(f.pending(), vec![1, 2]);

        let c = f.completer();
        assert_eq!(c.complete_next(), Some(1));
        assert_eq!(f.completed_value(), 1);
        c.complete_all();
        assert_eq!(f.completed_value(), 2);
        assert_eq!(c.complete_next(), None);
    }

    #[test]
    fn immediate_fence_retires_on_signal() {
        let f = CpuFence::immediate();
        f.signal(5).unwrap();
        assert!(f.is_complete(5));
        assert!(f.pending().is_empty());
    }

    #[test]
    fn wait_times_out() {
        let f = CpuFence::new();
        f.signal(1).unwrap();
        let err = f.wait(1, Some(Duration::from_millis(20))).unwrap_err();
        match err {
            RenderError::SynchronizationTimeout {
                value, completed, ..
            } => {
                assert_eq!(value, 1);
                assert_eq!(completed, 0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn wait_wakes_on_completion_from_other_thread() {
        let f = CpuFence::new();
        f.signal(3).unwrap();
        let c = f.completer();

        let gpu = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            c.complete_through(3);
        });

        f.wait(3, Some(Duration::from_secs(5))).unwrap();
        assert_eq!(f.completed_value(), 3);
        gpu.join().unwrap();
    }
}
