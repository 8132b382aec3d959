//! Trim correction for packed image symbols.
//!
//! The packer drops transparent borders, so the packed frame's top-left sits
//! at the trim offset inside the source image. The symbol position is shifted
//! by that offset in the symbol's own scaled and rotated space.

use frapack_backend_atlas::TrimOffset;
use frapack_model::Transform;

/// Position at which the trimmed frame must be drawn.
///
/// With zero rotation the scaled trim offset is added directly. Otherwise the
/// scaled offset vector is rotated by the symbol rotation (degrees) around
/// the symbol origin.
pub fn trim_corrected_position(transform: &Transform, trim: TrimOffset) -> (f64, f64) {
    let dx = trim.x as f64 * transform.scale_x;
    let dy = trim.y as f64 * transform.scale_y;

    if transform.rotation == 0.0 {
        return (transform.x + dx, transform.y + dy);
    }

    let magnitude = dx.hypot(dy);
    let pivot_angle = dy.atan2(dx).to_degrees();
    let angle = std::f64::consts::PI * (360.0 - (transform.rotation + pivot_angle)) / 180.0;
    (
        transform.x + magnitude * angle.cos(),
        transform.y - magnitude * angle.sin(),
    )
}
