// convert.rs — Map pipeline outputs to 8-bit images for display.
//
// The core never rescales its outputs. These helpers are for a presentation
// layer that wants to dump a contrast map, energy map or kernel as grey
// levels:
//
//   contrast_to_u8   signed map, symmetric range [-peak, peak] → [0, 255]
//                    (128 ≈ no net motion, bright = rightward, dark = leftward)
//   normalize_to_u8  any map, its own [min, max] → [0, 255]

use crate::image::{Image, Pixel};

/// Map `[-peak, peak]` linearly onto `[0, 255]`.
///
/// Values outside the range are clamped. A zero (or non-finite) peak maps
/// everything to mid-grey.
pub fn contrast_to_u8(map: &Image<f64>, peak: f64) -> Image<u8> {
    if !(peak.is_finite() && peak > 0.0) {
        return map.map(|_| 128u8);
    }
    map.map(|v| u8::from_f64((v / peak + 1.0) * 127.5))
}

/// Map the image's own `[min, max]` range linearly onto `[0, 255]`.
///
/// A constant image maps to all zeros.
pub fn normalize_to_u8(map: &Image<f64>) -> Image<u8> {
    match map.min_max() {
        Some((lo, hi)) if hi > lo => {
            let scale = 255.0 / (hi - lo);
            map.map(|v| u8::from_f64((v - lo) * scale))
        }
        _ => map.map(|_| 0u8),
    }
}
