//! Hand-off of one evaluation request to the render thread

/// Host render-event id that runs a pending DLSS evaluation
pub const EVALUATE_EVENT_ID: i32 = 0xD155_E001_u32 as i32;

/// Single-slot mailbox for a deferred evaluation
///
/// Posting overwrites an unconsumed request; taking empties the slot. There is
/// never more than one request in flight.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PendingEvaluation {
    slot: Option<u32>,
}

impl PendingEvaluation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request evaluation of `frame_index`, returning any request it replaced
    pub fn post(&mut self, frame_index: u32) -> Option<u32> {
        let replaced = self.slot.replace(frame_index);
        if let Some(previous) = replaced {
            log::debug!(
                "pending evaluation for frame {} replaced by frame {}",
                previous,
                frame_index
            );
        }
        replaced
    }

    /// Consume the pending request, if any
    pub fn take(&mut self) -> Option<u32> {
        self.slot.take()
    }

    pub fn is_pending(&self) -> bool {
        self.slot.is_some()
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }
}
