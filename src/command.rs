use std::fmt;

use crate::{LayoutParams, Pixel};

/// Spacing that makes one `|||||` glyph background exactly one pixel wide at scale 1.
pub const BASE_SCALE: f64 = 0.269;

const X_NUDGE: f64 = 0.046;
const Z_NUDGE: f64 = 0.097;

/// One `summon text_display` placement.
#[derive(Clone, Debug, PartialEq)]
pub struct Command {
    pub translation: [f64; 3],
    pub scale: f64,
    pub background: i32,
}

impl Command {
    pub fn from_pixel(pixel: &Pixel, params: &LayoutParams) -> Self {
        let [offset_x, offset_y, offset_z] = params.offset;
        Self {
            translation: [
                pixel.x as f64 * params.pixel_scale + offset_x + X_NUDGE,
                offset_y,
                pixel.y as f64 * params.pixel_scale + offset_z + Z_NUDGE,
            ],
            scale: params.pixel_scale / BASE_SCALE,
            background: pack_color(pixel.r, pixel.g, pixel.b, pixel.a),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x, y, z] = self.translation.map(Float);
        let s = Float(self.scale);
        write!(
            f,
            "summon text_display ~ ~ ~ {{text_opacity:10,transformation:{{\
             left_rotation:[-0.7f,0f,0f,0.7f],right_rotation:[0f,0f,0f,1f],\
             translation:[{x}f,{y}f,{z}f],scale:[{s}f,{s}f,{s}f]}},\
             text:'{{\"text\":\"|||||\"}}',background:{}}}",
            self.background
        )
    }
}

/// Packs a color as ARGB (alpha in the high byte, blue in the low byte), read as signed.
pub fn pack_color(r: u8, g: u8, b: u8, a: u8) -> i32 {
    (u32::from(a) << 24 | u32::from(r) << 16 | u32::from(g) << 8 | u32::from(b)) as i32
}

struct Float(f64);

impl fmt::Display for Float {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // -0 would otherwise print with its sign
        if self.0 == 0.0 {
            f.write_str("0")
        } else {
            write!(f, "{}", self.0)
        }
    }
}
