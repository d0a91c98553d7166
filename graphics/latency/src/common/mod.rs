//! Common latency types

use streamline::{FrameReport, SdkError};

/// Averaged latency breakdown, milliseconds
///
/// Laid out exactly as the host expects it, seven packed floats.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LatencyStats {
    pub sim_latency_ms: f32,
    pub render_submit_latency_ms: f32,
    pub present_latency_ms: f32,
    pub driver_latency_ms: f32,
    pub os_render_queue_latency_ms: f32,
    pub gpu_render_latency_ms: f32,
    /// Sum of the six phases
    pub total_latency_ms: f32,
}

/// Microseconds between two report timestamps, zero unless `end > start`
fn phase_us(start: u64, end: u64) -> f64 {
    if end > start {
        (end - start) as f64
    } else {
        0.0
    }
}

impl LatencyStats {
    /// Average the non-empty entries of a report ring
    ///
    /// Slots with a zero frame id have not been written by the driver yet and
    /// are skipped. Returns `None` when no slot holds a report.
    pub fn aggregate(reports: &[FrameReport]) -> Option<Self> {
        let mut sums = [0.0f64; 6];
        let mut valid = 0u32;

        for report in reports.iter().filter(|report| report.frame_id != 0) {
            let phases = [
                phase_us(report.sim_start_time, report.sim_end_time),
                phase_us(
                    report.render_submit_start_time,
                    report.render_submit_end_time,
                ),
                phase_us(report.present_start_time, report.present_end_time),
                phase_us(report.driver_start_time, report.driver_end_time),
                phase_us(
                    report.os_render_queue_start_time,
                    report.os_render_queue_end_time,
                ),
                phase_us(report.gpu_render_start_time, report.gpu_render_end_time),
            ];
            for (sum, phase) in sums.iter_mut().zip(phases) {
                *sum += phase / 1000.0;
            }
            valid += 1;
        }

        if valid == 0 {
            return None;
        }

        let [sim, render_submit, present, driver, os_queue, gpu] =
            sums.map(|sum| (sum / valid as f64) as f32);

        Some(Self {
            sim_latency_ms: sim,
            render_submit_latency_ms: render_submit,
            present_latency_ms: present,
            driver_latency_ms: driver,
            os_render_queue_latency_ms: os_queue,
            gpu_render_latency_ms: gpu,
            total_latency_ms: sim + render_submit + present + driver + os_queue + gpu,
        })
    }
}

/// Latency error types
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LatencyError {
    #[error("invalid low-latency mode {0}")]
    InvalidMode(i32),
    #[error("invalid latency marker {0}")]
    InvalidMarker(i32),
    #[error("latency reports not available yet")]
    ReportUnavailable,
    #[error("no valid frame reports")]
    NoValidReports,
    #[error("failed to get frame token: {0}")]
    FrameToken(SdkError),
    #[error(transparent)]
    Sdk(#[from] SdkError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(frame_id: u64, base: u64) -> FrameReport {
        FrameReport {
            frame_id,
            sim_start_time: base,
            sim_end_time: base + 2_000,
            render_submit_start_time: base + 2_000,
            render_submit_end_time: base + 3_000,
            present_start_time: base + 3_000,
            present_end_time: base + 3_500,
            driver_start_time: base + 3_000,
            driver_end_time: base + 4_000,
            os_render_queue_start_time: base + 4_000,
            os_render_queue_end_time: base + 4_250,
            gpu_render_start_time: base + 4_000,
            gpu_render_end_time: base + 8_000,
            ..FrameReport::default()
        }
    }

    #[test]
    fn test_aggregate_skips_empty_slots() {
        let mut ring = vec![FrameReport::default(); 61];
        ring.extend((1..=3).map(|id| report(id, id * 10_000)));

        let stats = LatencyStats::aggregate(&ring).unwrap();
        assert_eq!(stats.sim_latency_ms, 2.0);
        assert_eq!(stats.render_submit_latency_ms, 1.0);
        assert_eq!(stats.present_latency_ms, 0.5);
        assert_eq!(stats.driver_latency_ms, 1.0);
        assert_eq!(stats.os_render_queue_latency_ms, 0.25);
        assert_eq!(stats.gpu_render_latency_ms, 4.0);
        assert_eq!(stats.total_latency_ms, 8.75);
    }

    #[test]
    fn test_aggregate_divides_by_valid_count() {
        let mut late = report(2, 0);
        late.sim_end_time = 4_000;
        let ring = [report(1, 0), FrameReport::default(), late];

        let stats = LatencyStats::aggregate(&ring).unwrap();
        assert_eq!(stats.sim_latency_ms, 3.0);
    }

    #[test]
    fn test_inverted_phase_contributes_nothing() {
        let mut backwards = report(5, 50_000);
        backwards.gpu_render_end_time = backwards.gpu_render_start_time - 1;

        let stats = LatencyStats::aggregate(&[backwards]).unwrap();
        assert_eq!(stats.gpu_render_latency_ms, 0.0);
        assert_eq!(stats.sim_latency_ms, 2.0);
    }

    #[test]
    fn test_empty_ring_fails() {
        assert_eq!(LatencyStats::aggregate(&[]), None);
        assert_eq!(LatencyStats::aggregate(&[FrameReport::default(); 64]), None);
    }

    #[test]
    fn test_layout() {
        assert_eq!(core::mem::size_of::<LatencyStats>(), 28);
    }
}
