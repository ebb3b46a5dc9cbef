use std::collections::VecDeque;

/// Ticket for one requested frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

/// Host frame-callback mechanism, request-next-frame style.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Queue of requested frames, drained by the host once per native refresh.
#[derive(Debug, Default)]
pub struct FrameQueue {
    next_id: u64,
    pending: VecDeque<FrameHandle>,
    requested: u64,
    cancelled: u64,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles due on this refresh. Frames requested while these are being
    /// delivered land on the next refresh.
    pub fn take_due(&mut self) -> Vec<FrameHandle> {
        self.pending.drain(..).collect()
    }

    #[cfg(test)]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    #[cfg(test)]
    pub fn requested(&self) -> u64 {
        self.requested
    }

    #[cfg(test)]
    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next_id);
        self.next_id += 1;
        self.requested += 1;
        self.pending.push_back(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let before = self.pending.len();
        self.pending.retain(|h| *h != handle);
        if self.pending.len() != before {
            self.cancelled += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_unique() {
        let mut q = FrameQueue::new();
        let a = q.request_frame();
        let b = q.request_frame();
        assert_ne!(a, b);
        assert_eq!(q.take_due(), vec![a, b]);
        assert_eq!(q.pending_len(), 0);
    }

    #[test]
    fn test_cancel_removes_pending() {
        let mut q = FrameQueue::new();
        let a = q.request_frame();
        q.cancel_frame(a);
        q.cancel_frame(a);
        assert_eq!(q.pending_len(), 0);
        assert_eq!(q.cancelled(), 1);
        assert_eq!(q.requested(), 1);
    }
}
