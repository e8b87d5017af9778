use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use lux_ir::{load_devices, load_stylesheet, load_tree};
use lux_scene::{DmxFrame, Runner, apply_stylesheet};

fn demo_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos/basic")
}

fn load_demo() -> Result<Runner> {
    let dir = demo_dir();
    let devices = load_devices(dir.join("devices"))?;
    let tree = load_tree(dir.join("tree.xml"))?;
    let sheet = load_stylesheet(dir.join("style.css"))?;
    Ok(Runner::new(
        apply_stylesheet(&tree, &sheet),
        devices,
        sheet.keyframes,
    ))
}

fn frame_at(runner: &Runner, t: f64) -> Result<DmxFrame> {
    let channels = runner.channels_at(Duration::from_secs_f64(t))?;
    Ok(DmxFrame::from_channels(&channels))
}

#[test]
fn demo_show_passes_preflight() -> Result<()> {
    let runner = load_demo()?;
    let channels = runner.preflight()?;
    assert!(!channels.is_empty());
    Ok(())
}

#[test]
fn demo_moving_head_channels() -> Result<()> {
    let runner = load_demo()?;
    let frame = frame_at(&runner, 0.0)?;
    // head is placed at offset 20
    assert_eq!(frame.get(21), Some(20), "amber wheel slot");
    assert_eq!(frame.get(22), Some(127), "pulse speed");
    assert_eq!(frame.get(23), Some(10), "pulse direction");
    assert_eq!(frame.get(27), Some(76), "rotation speed");
    assert_eq!(frame.get(28), Some(128), "rotation mode select");
    Ok(())
}

#[test]
fn demo_wash_fades_in() -> Result<()> {
    let runner = load_demo()?;
    let start = frame_at(&runner, 0.0)?;
    assert_eq!(start.get(1), Some(0));
    assert_eq!(start.get(4), Some(0));

    let settled = frame_at(&runner, 10.0)?;
    let left: Vec<_> = (1..=4).filter_map(|address| settled.get(address)).collect();
    assert_eq!(left, vec![255, 120, 20, 255]);

    // the right par breathes once its delay has passed
    let breathing = frame_at(&runner, 2.0)?;
    assert!(breathing.get(10).unwrap_or_default() > 250);
    assert_eq!(breathing.get(8), Some(0));
    Ok(())
}
