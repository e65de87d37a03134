use super::*;

fn op(v: f64) -> Opacity {
    Opacity::new(v).unwrap()
}

#[test]
fn full_opacity_over_opaque_base_is_channel_max() {
    let base = [10.0, 200.0, 30.0, 255.0];
    let layer = [100.0, 50.0, 30.0, 255.0];
    assert_eq!(lighten_over(base, layer, op(1.0)), [100.0, 200.0, 30.0, 255.0]);
}

#[test]
fn half_opacity_mixes_lightened_color_with_base() {
    let base = [0.0, 40.0, 0.0, 255.0];
    let layer = [200.0, 0.0, 0.0, 255.0];
    // lighten = (200, 40, 0); half of it over the base.
    assert_eq!(lighten_over(base, layer, op(0.5)), [100.0, 40.0, 0.0, 255.0]);
}

#[test]
fn transparent_layer_leaves_base_untouched() {
    let base = [17.0, 99.0, 250.0, 200.0];
    let layer = [255.0, 255.0, 255.0, 0.0];
    assert_eq!(lighten_over(base, layer, op(1.0)), base);
}

#[test]
fn fully_transparent_operands_yield_zero() {
    let base = [17.0, 99.0, 250.0, 0.0];
    let layer = [255.0, 255.0, 255.0, 0.0];
    assert_eq!(lighten_over(base, layer, op(0.75)), [0.0; 4]);
}

#[test]
fn transparent_base_takes_layer_color_and_scaled_alpha() {
    let base = [0.0, 0.0, 0.0, 0.0];
    let layer = [80.0, 160.0, 240.0, 255.0];
    assert_eq!(
        lighten_over(base, layer, op(0.5)),
        [80.0, 160.0, 240.0, 127.5]
    );
}

#[test]
fn tiny_opacity_barely_moves_the_base() {
    let base = [12.0, 34.0, 56.0, 255.0];
    let layer = [255.0, 255.0, 255.0, 255.0];
    let out = lighten_over(base, layer, op(1e-9));
    for i in 0..4 {
        assert!((out[i] - base[i]).abs() < 1e-6, "channel {i}: {out:?}");
    }
}

#[test]
fn lighten_never_darkens_below_the_darker_input() {
    let levels = [0.0, 1.0, 63.5, 128.0, 254.0, 255.0];
    let base_alphas = [1.0, 128.0, 255.0];
    let layer_alphas = [0.0, 128.0, 255.0];
    let opacities = [0.01, 0.3125, 0.5, 1.0];

    for &b in &levels {
        for &l in &levels {
            for &ba in &base_alphas {
                for &la in &layer_alphas {
                    for &o in &opacities {
                        let base = [b, l, b, ba];
                        let layer = [l, b, b, la];
                        let out = lighten_over(base, layer, op(o));
                        for i in 0..3 {
                            let floor = base[i].min(layer[i]);
                            assert!(
                                out[i] >= floor - 1e-9,
                                "out {out:?} below min for base {base:?} layer {layer:?} op {o}"
                            );
                            assert!(out[i] >= base[i] - 1e-9);
                        }
                        if la == 0.0 {
                            assert!((out[0] - base[0]).abs() < 1e-9);
                            assert_eq!(out[3], ba);
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn in_place_rejects_mismatched_layer_without_mutation() {
    let mut acc = NormalizedFrame::from_raw(2, 1, vec![1.0, 2.0, 3.0, 255.0, 4.0, 5.0, 6.0, 255.0])
        .unwrap();
    let before = acc.clone();
    let layer = NormalizedFrame::from_raw(1, 1, vec![255.0; 4]).unwrap();

    let err = lighten_over_in_place(&mut acc, &layer, op(1.0)).unwrap_err();
    assert!(matches!(err, LightrailError::Format(_)));
    assert_eq!(acc, before);
}

#[test]
fn frame_variant_matches_in_place() {
    let base = NormalizedFrame::from_raw(1, 2, vec![0.0, 50.0, 0.0, 255.0, 9.0, 9.0, 9.0, 255.0])
        .unwrap();
    let layer = NormalizedFrame::from_raw(1, 2, vec![100.0, 0.0, 0.0, 255.0, 1.0, 1.0, 1.0, 255.0])
        .unwrap();

    let out = lighten_over_frame(&base, &layer, op(0.3125)).unwrap();
    let mut in_place = base.clone();
    lighten_over_in_place(&mut in_place, &layer, op(0.3125)).unwrap();
    assert_eq!(out, in_place);
    assert_ne!(out, base);
}
