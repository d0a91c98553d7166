//! NVIDIA Reflex low-latency mode and PC-latency markers

use streamline::{
    PclFunctions, PclMarker, ReflexFunctions, ReflexMode, ReflexOptions, ReflexState, Streamline,
};

use crate::common::{LatencyError, LatencyStats};
use crate::frame_pacing::FrameCounter;

/// Reflex context
///
/// Holds the mode last accepted by the SDK. The SDK function sets are passed
/// in per call so the context never outlives a device binding.
#[derive(Debug, Default)]
pub struct ReflexContext {
    mode: ReflexMode,
}

impl ReflexContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mode last accepted by the SDK
    pub fn mode(&self) -> ReflexMode {
        self.mode
    }

    /// Set Reflex mode from its raw host value
    ///
    /// The mode is recorded only once the SDK accepts it.
    pub fn set_mode(
        &mut self,
        functions: &dyn ReflexFunctions,
        raw: i32,
    ) -> Result<ReflexMode, LatencyError> {
        let mode = ReflexMode::from_raw(raw).ok_or(LatencyError::InvalidMode(raw))?;

        let options = ReflexOptions {
            mode,
            frame_limit_us: 0,
        };
        functions.set_options(&options).map_err(|err| {
            log::error!("Failed to set Reflex mode: {}", err);
            LatencyError::Sdk(err)
        })?;

        log::info!("Reflex mode: {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
        Ok(mode)
    }

    pub fn state(functions: &dyn ReflexFunctions) -> Result<ReflexState, LatencyError> {
        Ok(functions.get_state()?)
    }

    /// Averaged latency over the driver's report ring
    pub fn latency_stats(functions: &dyn ReflexFunctions) -> Result<LatencyStats, LatencyError> {
        let state = functions.get_state()?;
        if !state.latency_report_available {
            return Err(LatencyError::ReportUnavailable);
        }

        let stats =
            LatencyStats::aggregate(&state.frame_reports).ok_or(LatencyError::NoValidReports)?;
        log::trace!("latency stats: {:?}", stats);
        Ok(stats)
    }

    /// Forget the recorded mode
    pub fn reset(&mut self) {
        self.mode = ReflexMode::Off;
    }
}

/// Submit a PC-latency marker for the counter's current frame
///
/// Out-of-range markers are rejected before any SDK call.
pub fn set_marker(
    sdk: &dyn Streamline,
    pcl: &dyn PclFunctions,
    raw: i32,
    counter: &FrameCounter,
) -> Result<PclMarker, LatencyError> {
    let marker = PclMarker::new(raw).ok_or(LatencyError::InvalidMarker(raw))?;
    let token = sdk
        .get_new_frame_token(counter.token_index())
        .map_err(LatencyError::FrameToken)?;

    log::trace!("Reflex marker {} (frame {})", marker.raw(), token.index());
    pcl.set_marker(marker, &token)?;
    Ok(marker)
}

/// Event ids accepted by the host render-thread dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReflexEvent {
    /// Begin frame, pacing sleep, then simulation start
    FrameBegin,
    Marker(PclMarker),
}

impl ReflexEvent {
    pub fn from_id(id: i32) -> Option<Self> {
        let marker = match id {
            0 => return Some(ReflexEvent::FrameBegin),
            1 => PclMarker::SIMULATION_END,
            2 => PclMarker::RENDER_SUBMIT_START,
            3 => PclMarker::RENDER_SUBMIT_END,
            4 => PclMarker::PRESENT_START,
            5 => PclMarker::PRESENT_END,
            _ => return None,
        };
        Some(ReflexEvent::Marker(marker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use streamline::mock::{Call, EntryPoint, MockStreamline};
    use streamline::{FrameReport, SdkError};

    #[test]
    fn test_set_mode_records_on_success() {
        let sdk = MockStreamline::new();
        let mut reflex = ReflexContext::new();

        assert_eq!(reflex.set_mode(&sdk, 2), Ok(ReflexMode::LowLatencyWithBoost));
        assert_eq!(reflex.mode(), ReflexMode::LowLatencyWithBoost);
        assert_eq!(
            sdk.calls(),
            vec![Call::ReflexSetOptions(ReflexMode::LowLatencyWithBoost)]
        );
    }

    #[test]
    fn test_set_mode_keeps_mode_on_failure() {
        let sdk = MockStreamline::new();
        let mut reflex = ReflexContext::new();
        sdk.fail(EntryPoint::ReflexSetOptions, SdkError::INVALID_STATE);

        assert_eq!(
            reflex.set_mode(&sdk, 1),
            Err(LatencyError::Sdk(SdkError::INVALID_STATE))
        );
        assert_eq!(reflex.mode(), ReflexMode::Off);
    }

    #[test]
    fn test_invalid_mode_never_reaches_sdk() {
        let sdk = MockStreamline::new();
        let mut reflex = ReflexContext::new();

        assert_eq!(reflex.set_mode(&sdk, 3), Err(LatencyError::InvalidMode(3)));
        assert_eq!(reflex.set_mode(&sdk, -1), Err(LatencyError::InvalidMode(-1)));
        assert!(sdk.calls().is_empty());
    }

    #[test]
    fn test_marker_out_of_range() {
        let sdk = MockStreamline::new();
        let counter = FrameCounter::new();

        for raw in [-1, PclMarker::MAXIMUM as i32, 1000] {
            assert_eq!(
                set_marker(&sdk, &sdk, raw, &counter),
                Err(LatencyError::InvalidMarker(raw))
            );
        }
        assert!(sdk.calls().is_empty());
    }

    #[test]
    fn test_marker_uses_current_frame() {
        let sdk = MockStreamline::new();
        let mut counter = FrameCounter::new();
        counter.begin_frame();
        counter.begin_frame();

        assert_eq!(
            set_marker(&sdk, &sdk, 7, &counter),
            Ok(PclMarker::TRIGGER_FLASH)
        );
        assert_eq!(
            sdk.calls(),
            vec![
                Call::GetNewFrameToken(2),
                Call::PclSetMarker {
                    marker: 7,
                    frame_index: 2
                },
            ]
        );
    }

    #[test]
    fn test_stats_need_report_availability() {
        let sdk = MockStreamline::new();
        assert_eq!(
            ReflexContext::latency_stats(&sdk),
            Err(LatencyError::ReportUnavailable)
        );

        sdk.set_reflex_state(ReflexState {
            latency_report_available: true,
            frame_reports: vec![FrameReport::default(); 64],
            ..ReflexState::default()
        });
        assert_eq!(
            ReflexContext::latency_stats(&sdk),
            Err(LatencyError::NoValidReports)
        );
    }

    #[test]
    fn test_event_ids() {
        assert_eq!(ReflexEvent::from_id(0), Some(ReflexEvent::FrameBegin));
        assert_eq!(
            ReflexEvent::from_id(5),
            Some(ReflexEvent::Marker(PclMarker::PRESENT_END))
        );
        assert_eq!(ReflexEvent::from_id(6), None);
        assert_eq!(ReflexEvent::from_id(-1), None);
    }
}
