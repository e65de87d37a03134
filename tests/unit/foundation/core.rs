use super::*;

#[test]
fn opacity_accepts_half_open_unit_interval() {
    assert_eq!(Opacity::new(1.0).unwrap(), Opacity::FULL);
    assert_eq!(Opacity::new(0.3125).unwrap(), Opacity::DEFAULT);
    assert_eq!(Opacity::default().get(), 0.3125);
    assert!(Opacity::new(f64::MIN_POSITIVE).is_ok());
}

#[test]
fn opacity_rejects_out_of_range_values() {
    for v in [0.0, -0.5, 1.0000001, 2.0, f64::NAN, f64::INFINITY] {
        let err = Opacity::new(v).unwrap_err();
        assert!(
            matches!(err, LightrailError::InvalidParameter(_)),
            "opacity {v} should be rejected"
        );
    }
}

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    assert_eq!(Fps::new(30000, 1001).unwrap().to_string(), "30000/1001");
    assert_eq!(Fps::new(30, 1).unwrap().to_string(), "30");
}

#[test]
fn channel_layout_only_allows_three_or_four() {
    assert_eq!(ChannelLayout::from_channels(3).unwrap(), ChannelLayout::Rgb);
    assert_eq!(ChannelLayout::from_channels(4).unwrap(), ChannelLayout::Rgba);
    for n in [1u8, 2, 5] {
        assert!(matches!(
            ChannelLayout::from_channels(n),
            Err(LightrailError::Format(_))
        ));
    }
}

#[test]
fn frame_shape_sizes() {
    let shape = FrameShape::new(4, 3, 3).unwrap();
    assert_eq!(shape.pixel_count(), 12);
    assert_eq!(shape.byte_len(), 36);
    assert_eq!(shape.to_string(), "4x3x3");
    assert!(FrameShape::new(0, 3, 3).is_err());
    assert!(FrameShape::new(4, 3, 0).is_err());
}

#[test]
fn parse_size_accepts_wxh() {
    assert_eq!(parse_size("640x480").unwrap(), (640, 480));
    assert_eq!(parse_size(" 1280X720 ").unwrap(), (1280, 720));
    for bad in ["640", "x480", "640x", "0x480", "axb", "640x480x3"] {
        assert!(parse_size(bad).is_err(), "{bad} should be rejected");
    }
}

#[test]
fn frame_budget_rounds_and_floors_at_one() {
    let fps = Fps::new(30, 1).unwrap();
    let vga = FrameShape::new(640, 480, 3).unwrap();
    assert_eq!(frame_budget(10.0, fps, vga).unwrap(), 300);
    assert_eq!(frame_budget(0.01, fps, vga).unwrap(), 1);
    assert_eq!(frame_budget(3600.0, fps, vga).unwrap(), 108_000);

    let ntsc = Fps::new(30000, 1001).unwrap();
    assert_eq!(frame_budget(10.0, ntsc, vga).unwrap(), 300);
}

#[test]
fn frame_budget_rejects_unaddressable_captures() {
    let fps = Fps::new(30, 1).unwrap();
    let vga = FrameShape::new(640, 480, 3).unwrap();
    for secs in [1e300, f64::MAX, 1e18, 1e12] {
        assert!(matches!(
            frame_budget(secs, fps, vga),
            Err(LightrailError::InvalidParameter(_))
        ));
    }
}

#[test]
fn frame_budget_rejects_non_positive_duration() {
    let fps = Fps::new(30, 1).unwrap();
    let shape = FrameShape::new(2, 2, 3).unwrap();
    for secs in [0.0, -1.0, f64::NAN] {
        assert!(matches!(
            frame_budget(secs, fps, shape),
            Err(LightrailError::InvalidParameter(_))
        ));
    }
}

#[test]
fn format_duration_drops_leading_zero_units() {
    assert_eq!(format_duration(5), "5s");
    assert_eq!(format_duration(125), "2m 5s");
    assert_eq!(format_duration(3725), "1h 2m 5s");
    assert_eq!(format_duration(3600), "1h 0m 0s");
}
