//! Numbers drawn as one sprite per digit

use glam::Vec2;

use super::RenderError;
use crate::platform::{SpriteAsset, SpriteHandle, SpriteService};

/// Horizontal distance between digit sprites
pub const DIGIT_SPACING: f32 = 10.0;

/// Replace the sprites in `digits` with `value`, drawn right to left.
///
/// The least significant digit sits `DIGIT_SPACING` pixels left of `origin`
/// and each more significant one another `DIGIT_SPACING` further left.
/// Zero draws nothing, and at most `capacity` digits are drawn.
pub fn render_number<S: SpriteService + ?Sized>(
    sprites: &mut S,
    digits: &mut Vec<SpriteHandle>,
    capacity: usize,
    origin: Vec2,
    value: u32,
) -> Result<(), RenderError> {
    for handle in digits.drain(..) {
        sprites.destroy_sprite(handle);
    }

    let mut rest = value;
    let mut position = origin;
    while rest > 0 && digits.len() < capacity {
        position.x -= DIGIT_SPACING;
        let handle = sprites.create_sprite(SpriteAsset::Numbers, position, (rest % 10) as u16)?;
        digits.push(handle);
        rest /= 10;
    }
    Ok(())
}
