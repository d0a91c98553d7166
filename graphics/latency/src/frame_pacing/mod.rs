//! Frame counting and the pacing sleep

use std::sync::Arc;

use streamline::{FrameToken, ReflexFunctions, Streamline};

use crate::common::LatencyError;

/// Bridge-wide frame counter
///
/// Shared by the low-latency and upscaling begin-frame calls; frame tokens are
/// requested for the low 32 bits of the current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameCounter {
    frame_id: u64,
}

impl FrameCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to the next frame and return its id
    pub fn begin_frame(&mut self) -> u64 {
        self.frame_id = self.frame_id.wrapping_add(1);
        log::trace!("frame {} begin", self.frame_id);
        self.frame_id
    }

    pub fn current(&self) -> u64 {
        self.frame_id
    }

    /// Index frame tokens are requested for
    pub fn token_index(&self) -> u32 {
        self.frame_id as u32
    }

    pub fn reset(&mut self) {
        self.frame_id = 0;
    }
}

/// A pacing sleep that has its frame token and can run without any lock held
///
/// The SDK blocks the caller inside [`SleepTicket::sleep`] until its computed
/// release time.
pub struct SleepTicket {
    functions: Arc<dyn ReflexFunctions>,
    token: FrameToken,
}

impl SleepTicket {
    /// Request the frame token for `counter`'s current frame
    pub fn prepare(
        sdk: &dyn Streamline,
        functions: Arc<dyn ReflexFunctions>,
        counter: &FrameCounter,
    ) -> Result<Self, LatencyError> {
        let token = sdk
            .get_new_frame_token(counter.token_index())
            .map_err(LatencyError::FrameToken)?;
        Ok(Self { functions, token })
    }

    pub fn frame_index(&self) -> u32 {
        self.token.index()
    }

    pub fn sleep(self) -> Result<(), LatencyError> {
        log::trace!("sleep frame {}", self.token.index());
        self.functions.sleep(&self.token)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use streamline::mock::{Call, EntryPoint, MockStreamline};
    use streamline::SdkError;

    #[test]
    fn test_counter() {
        let mut counter = FrameCounter::new();
        assert_eq!(counter.current(), 0);
        assert_eq!(counter.begin_frame(), 1);
        assert_eq!(counter.begin_frame(), 2);
        assert_eq!(counter.token_index(), 2);
        counter.reset();
        assert_eq!(counter.current(), 0);
    }

    #[test]
    fn test_token_index_truncates() {
        let mut counter = FrameCounter {
            frame_id: u32::MAX as u64,
        };
        counter.begin_frame();
        assert_eq!(counter.token_index(), 0);
        assert_eq!(counter.current(), 1 << 32);
    }

    #[test]
    fn test_sleep_uses_prepared_token() {
        let sdk = MockStreamline::new();
        let mut counter = FrameCounter::new();
        counter.begin_frame();

        let ticket = SleepTicket::prepare(&sdk, Arc::new(sdk.clone()), &counter).unwrap();
        counter.begin_frame();
        assert_eq!(ticket.frame_index(), 1);
        ticket.sleep().unwrap();

        assert_eq!(
            sdk.calls(),
            vec![Call::GetNewFrameToken(1), Call::ReflexSleep(1)]
        );
    }

    #[test]
    fn test_token_failure() {
        let sdk = MockStreamline::new();
        sdk.fail(EntryPoint::GetNewFrameToken, SdkError::INVALID_STATE);

        let result = SleepTicket::prepare(&sdk, Arc::new(sdk.clone()), &FrameCounter::new());
        assert!(matches!(
            result,
            Err(LatencyError::FrameToken(SdkError::INVALID_STATE))
        ));
        assert_eq!(sdk.count(|call| matches!(call, Call::ReflexSleep(_))), 0);
    }
}
