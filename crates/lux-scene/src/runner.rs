//! The show loop: compile a frame per tick and hand it to every output.

use std::time::Duration;

use lux_ir::{DeviceMap, TreeNode, check_address_conflicts};

use crate::animation::KeyframeMap;
use crate::error::{FrameError, PreflightError, SinkError};
use crate::frame::{DmxFrame, compute_frame};

/// A destination for compiled frames (a network node, a serial widget, a
/// console log).
pub trait FrameSink {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Deliver one frame. Errors are reported to the caller, who decides
    /// whether to retry.
    fn send(&mut self, frame: &DmxFrame) -> Result<(), SinkError>;
}

struct SinkSlot {
    sink: Box<dyn FrameSink>,
    /// Last frame this sink accepted.
    last: Option<DmxFrame>,
}

/// Outcome of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// Channels written by the compiled frame.
    pub channels: usize,
    /// Sinks that accepted the frame.
    pub sent: usize,
    /// Sinks whose send failed; they are retried next tick.
    pub failed: usize,
}

/// Owns a styled show and its outputs.
pub struct Runner {
    tree: TreeNode,
    devices: DeviceMap,
    keyframes: KeyframeMap,
    sinks: Vec<SinkSlot>,
}

impl Runner {
    /// `tree` must already carry its cascaded styles.
    pub fn new(tree: TreeNode, devices: DeviceMap, keyframes: KeyframeMap) -> Self {
        Self {
            tree,
            devices,
            keyframes,
            sinks: Vec::new(),
        }
    }

    pub fn add_sink(&mut self, sink: Box<dyn FrameSink>) {
        tracing::info!(sink = sink.name(), "output attached");
        self.sinks.push(SinkSlot { sink, last: None });
    }

    pub fn with_sink(mut self, sink: Box<dyn FrameSink>) -> Self {
        self.add_sink(sink);
        self
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    pub fn tree(&self) -> &TreeNode {
        &self.tree
    }

    /// Channel list of the show at time `t`.
    pub fn channels_at(&self, t: Duration) -> Result<Vec<(u16, u8)>, FrameError> {
        compute_frame(&self.tree, &self.devices, &self.keyframes, t.as_secs_f64())
    }

    /// Fail early on a show that cannot run: overlapping device placements,
    /// missing keyframes or channels outside the universe.
    pub fn preflight(&self) -> Result<Vec<(u16, u8)>, PreflightError> {
        check_address_conflicts(&self.tree, &self.devices)?;
        let channels = self.channels_at(Duration::ZERO)?;
        tracing::info!(channels = channels.len(), "preflight passed");
        Ok(channels)
    }

    /// Compile the frame at `t` and send it to every sink whose last
    /// accepted frame differs.
    pub fn tick(&mut self, t: Duration) -> Result<TickReport, FrameError> {
        let channels = self.channels_at(t)?;
        let frame = DmxFrame::from_channels(&channels);
        let mut report = TickReport {
            channels: channels.len(),
            ..TickReport::default()
        };

        for slot in &mut self.sinks {
            if slot.last.as_ref() == Some(&frame) {
                continue;
            }
            match slot.sink.send(&frame) {
                Ok(()) => {
                    slot.last = Some(frame);
                    report.sent += 1;
                }
                Err(err) => {
                    tracing::warn!(sink = slot.sink.name(), error = %err, "frame not delivered");
                    report.failed += 1;
                }
            }
        }
        Ok(report)
    }

    /// Tick once per item of `schedule` until it ends. A tick that fails to
    /// compile is logged and skipped. Returns the number of ticks run.
    pub fn run<I>(&mut self, schedule: I) -> usize
    where
        I: IntoIterator<Item = Duration>,
    {
        let mut ticks = 0;
        for t in schedule {
            ticks += 1;
            match self.tick(t) {
                Ok(report) if report.sent > 0 => {
                    tracing::debug!(t = t.as_secs_f64(), sent = report.sent, "frame changed");
                }
                Ok(_) => {}
                Err(err) => tracing::warn!(t = t.as_secs_f64(), error = %err, "skipping tick"),
            }
        }
        tracing::info!(ticks, "show finished");
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cascade::apply_stylesheet;
    use lux_ir::{parse_device_document, parse_stylesheet};
    use std::cell::RefCell;
    use std::rc::Rc;

    const PAR: &str = r#"{"name": "par", "mapping": {"color": {
        "red": {"chan": 1}, "green": {"chan": 2}, "blue": {"chan": 3}, "alpha": {"chan": 4}
    }}}"#;

    #[derive(Default)]
    struct Recorder {
        frames: Rc<RefCell<Vec<DmxFrame>>>,
        fail_next: Rc<RefCell<usize>>,
    }

    impl FrameSink for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn send(&mut self, frame: &DmxFrame) -> Result<(), SinkError> {
            let mut fail = self.fail_next.borrow_mut();
            if *fail > 0 {
                *fail -= 1;
                return Err(SinkError::Io(std::io::Error::other("unplugged")));
            }
            self.frames.borrow_mut().push(*frame);
            Ok(())
        }
    }

    fn runner(css: &str) -> Runner {
        let doc = parse_device_document(PAR, "par.json").unwrap();
        let devices = DeviceMap::from([(doc.name, doc.mapping)]);
        let sheet = parse_stylesheet(css).unwrap();
        let tree = apply_stylesheet(&TreeNode::new("par"), &sheet);
        Runner::new(tree, devices, sheet.keyframes)
    }

    #[test]
    fn test_unchanged_frames_are_not_resent() {
        let recorder = Recorder::default();
        let frames = recorder.frames.clone();
        let mut runner = runner("par { color: #ff0000; }").with_sink(Box::new(recorder));

        let first = runner.tick(Duration::ZERO).unwrap();
        assert_eq!(first.sent, 1);
        assert_eq!(first.channels, 4);
        let second = runner.tick(Duration::from_millis(20)).unwrap();
        assert_eq!(second.sent, 0);
        assert_eq!(frames.borrow().len(), 1);
        assert_eq!(frames.borrow()[0].get(1), Some(255));
    }

    #[test]
    fn test_failed_send_is_retried() {
        let recorder = Recorder::default();
        *recorder.fail_next.borrow_mut() = 1;
        let frames = recorder.frames.clone();
        let mut runner = runner("par { color: #00ff00; }").with_sink(Box::new(recorder));

        assert_eq!(runner.tick(Duration::ZERO).unwrap().failed, 1);
        assert_eq!(runner.tick(Duration::from_millis(20)).unwrap().sent, 1);
        assert_eq!(frames.borrow().len(), 1);
    }

    #[test]
    fn test_sinks_track_their_own_last_frame() {
        let healthy = Recorder::default();
        let flaky = Recorder::default();
        *flaky.fail_next.borrow_mut() = 1;
        let flaky_frames = flaky.frames.clone();
        let mut runner = runner("par { color: #0000ff; }")
            .with_sink(Box::new(healthy))
            .with_sink(Box::new(flaky));

        let report = runner.tick(Duration::ZERO).unwrap();
        assert_eq!((report.sent, report.failed), (1, 1));
        let report = runner.tick(Duration::from_millis(20)).unwrap();
        assert_eq!((report.sent, report.failed), (1, 0));
        assert_eq!(flaky_frames.borrow().len(), 1);
    }

    #[test]
    fn test_animation_sends_each_change() {
        let recorder = Recorder::default();
        let frames = recorder.frames.clone();
        let mut runner = runner(
            "par { animation: fade 1s linear infinite; }\n\
             @keyframes fade { from { color: rgba(255, 0, 0, 1) } to { color: rgba(255, 0, 0, 0) } }",
        )
        .with_sink(Box::new(recorder));

        let schedule = (0..10).map(|i| Duration::from_millis(i * 100));
        assert_eq!(runner.run(schedule), 10);
        let alphas: Vec<_> = frames.borrow().iter().filter_map(|f| f.get(4)).collect();
        assert_eq!(alphas.len(), 10);
        assert!(alphas.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_preflight_reports_missing_keyframes() {
        let runner = runner("par { animation: ghost 1s; }");
        assert!(matches!(
            runner.preflight(),
            Err(PreflightError::Frame(FrameError::Eval(_)))
        ));
    }

    #[test]
    fn test_run_skips_failing_ticks() {
        let recorder = Recorder::default();
        let frames = recorder.frames.clone();
        let mut runner = runner("par { animation: ghost 1s; }").with_sink(Box::new(recorder));
        assert_eq!(runner.run([Duration::ZERO, Duration::from_millis(10)]), 2);
        assert!(frames.borrow().is_empty());
    }
}
