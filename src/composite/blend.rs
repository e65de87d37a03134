use crate::foundation::core::Opacity;
use crate::foundation::error::{LightrailError, LightrailResult};
use crate::frame::normalize::NormalizedFrame;

/// Straight-alpha RGBA sample in the 0-255 float domain.
pub type RgbaF = [f64; 4];

/// Lighten `layer` onto `base`, then composite the lightened color source-over with the
/// layer alpha scaled by `opacity`.
///
/// Both operands are straight (non-premultiplied) alpha in 0-255. When the resulting alpha is
/// zero the color is zero as well.
pub fn lighten_over(base: RgbaF, layer: RgbaF, opacity: Opacity) -> RgbaF {
    let eff_alpha = layer[3] * opacity.get();
    let inv = 1.0 - eff_alpha / 255.0;
    let out_alpha = eff_alpha + base[3] * inv;
    if out_alpha == 0.0 {
        return [0.0; 4];
    }

    let mut out = [0.0; 4];
    for i in 0..3 {
        let lighten = base[i].max(layer[i]);
        out[i] = (lighten * eff_alpha + base[i] * base[3] * inv) / out_alpha;
    }
    out[3] = out_alpha;
    out
}

/// Apply [`lighten_over`] to every pixel of `acc`. Dimensions are checked before any pixel is
/// touched, so a mismatch leaves `acc` unchanged.
pub fn lighten_over_in_place(
    acc: &mut NormalizedFrame,
    layer: &NormalizedFrame,
    opacity: Opacity,
) -> LightrailResult<()> {
    if !acc.same_dimensions(layer) {
        return Err(LightrailError::format(format!(
            "layer is {}x{}, accumulator is {}x{}",
            layer.width(),
            layer.height(),
            acc.width(),
            acc.height()
        )));
    }

    for (a, l) in acc
        .data_mut()
        .chunks_exact_mut(4)
        .zip(layer.data().chunks_exact(4))
    {
        let out = lighten_over([a[0], a[1], a[2], a[3]], [l[0], l[1], l[2], l[3]], opacity);
        a.copy_from_slice(&out);
    }
    Ok(())
}

/// Non-mutating form of [`lighten_over_in_place`].
pub fn lighten_over_frame(
    base: &NormalizedFrame,
    layer: &NormalizedFrame,
    opacity: Opacity,
) -> LightrailResult<NormalizedFrame> {
    let mut out = base.clone();
    lighten_over_in_place(&mut out, layer, opacity)?;
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/composite/blend.rs"]
mod tests;
