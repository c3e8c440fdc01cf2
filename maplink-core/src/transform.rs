use rand::Rng;

/// Upper bound (exclusive) of the random offset added to a visible
/// coordinate before it is converted. Visible coordinates are rounded to one
/// decimal, so the offset keeps the raw position inside the same displayed
/// tenth.
pub const MAX_JITTER: f32 = 0.07;

/// Convert one visible map coordinate into the host's raw fixed-point
/// position.
///
/// `offset` and `factor` are the map's offset along this axis and its size
/// factor (100 = 1.0 scale). Arithmetic is done in single precision to match
/// the host. A zero `factor` yields a non-finite intermediate which the final
/// cast saturates; callers reject such maps beforehand.
pub fn to_raw(visible: f32, offset: i16, factor: u16, jitter: f32) -> i32 {
    let visible = visible + jitter;
    let scale = factor as f32 / 100.0;
    let scaled = ((((visible - 1.0) * scale / 41.0) * 2048.0) - 1024.0) / scale;
    ((scaled - offset as f32).ceil() as i32).saturating_mul(1000)
}

/// Like [`to_raw`], drawing a fresh jitter in `[0, MAX_JITTER)` from `rng`.
pub fn generate_raw_position<R: Rng + ?Sized>(
    rng: &mut R,
    visible: f32,
    offset: i16,
    factor: u16,
) -> i32 {
    let jitter = rng.gen::<f32>() * MAX_JITTER;
    to_raw(visible, offset, factor, jitter)
}
