/// Single-slot coalescer for work that should run at most once per frame.
///
/// Pointer moves arrive faster than the host can lay out. Each move
/// overwrites the pending value; the host only has to schedule a frame
/// callback when [`FrameSlot::schedule`] returns `true`, and the callback
/// drains the latest value with [`FrameSlot::take`]. Superseded values are
/// dropped, never queued.
#[derive(Debug, Clone)]
pub struct FrameSlot<T> {
    pending: Option<T>,
}

impl<T> Default for FrameSlot<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> FrameSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` for the next frame. Returns `true` when no frame was
    /// pending, meaning the caller must request one.
    pub fn schedule(&mut self, value: T) -> bool {
        self.pending.replace(value).is_none()
    }

    /// Drain the pending value, if any.
    pub fn take(&mut self) -> Option<T> {
        self.pending.take()
    }

    /// Discard the pending value without running it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
