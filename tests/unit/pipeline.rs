use std::path::Path;

use super::*;

fn write_frames(dir: &Path, values: &[[u8; 3]]) {
    for (i, v) in values.iter().enumerate() {
        image::RgbImage::from_pixel(2, 2, image::Rgb(*v))
            .save(dir.join(format!("{i:04}.png")))
            .unwrap();
    }
}

#[test]
fn directory_run_writes_composite() {
    let tmp = tempfile::tempdir().unwrap();
    let frames_dir = tmp.path().join("set");
    std::fs::create_dir(&frames_dir).unwrap();
    write_frames(&frames_dir, &[[0, 0, 0], [100, 0, 0], [0, 0, 200]]);

    let out = tmp.path().join("out.png");
    let mut cfg = RunConfig::new(InputSpec::Directory(frames_dir), &out);
    cfg.opacity = Opacity::FULL;

    let report = run(&cfg, &CancelToken::new()).unwrap();
    assert_eq!(report.frames, 3);
    assert_eq!(report.shape, FrameShape::new(2, 2, 3).unwrap());
    assert!(report.raw_dir.is_none());

    let img = image::open(&out).unwrap().into_rgba8();
    assert_eq!(img.get_pixel(1, 1).0, [100, 0, 200, 255]);
}

#[test]
fn cancelled_run_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let frames_dir = tmp.path().join("set");
    std::fs::create_dir(&frames_dir).unwrap();
    write_frames(&frames_dir, &[[1, 1, 1], [2, 2, 2]]);

    let out = tmp.path().join("out.png");
    let cfg = RunConfig::new(InputSpec::Directory(frames_dir), &out);
    let token = CancelToken::new();
    token.cancel();

    assert!(run(&cfg, &token).unwrap_err().is_cancelled());
    assert!(!out.exists());
}

#[test]
fn camera_runs_reject_non_positive_duration_before_opening_device() {
    let mut cfg = RunConfig::new(InputSpec::Camera(CameraOpts::new(0)), "out.png");
    for secs in [0.0, -3.0, f64::NAN] {
        cfg.seconds = secs;
        assert!(matches!(
            cfg.validate(),
            Err(LightrailError::InvalidParameter(_))
        ));
    }
}

#[test]
fn unsupported_output_is_rejected_before_acquisition() {
    let cfg = RunConfig::new(InputSpec::Directory("does-not-exist".into()), "out.jpg");
    assert!(matches!(
        run(&cfg, &CancelToken::new()),
        Err(LightrailError::InvalidParameter(_))
    ));
}

#[test]
fn saved_capture_sets_are_read_back_in_order() {
    let tmp = tempfile::tempdir().unwrap();
    let frames = FrameSequence::from_frames(
        (0u8..12).map(|v| crate::frame::buffer::Frame::filled(1, 1, &[v * 10, 0, 0]).unwrap()),
    )
    .unwrap();
    let fps = Fps::new(30, 1).unwrap();
    let dir = save_raw_frames(
        &frames,
        tmp.path(),
        3,
        Some(fps),
        chrono::Local::now(),
        &CancelToken::new(),
    )
    .unwrap();

    let acquired = acquire(&InputSpec::Directory(dir), 0.0, &CancelToken::new()).unwrap();
    assert_eq!(acquired.fps, Some(fps));
    assert_eq!(acquired.camera_id, Some(3));
    let reds: Vec<u8> = acquired.frames.iter().map(|f| f.data()[0]).collect();
    assert_eq!(reds, (0u8..12).map(|v| v * 10).collect::<Vec<_>>());
}
