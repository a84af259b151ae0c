//! Raster encoding: flat and isometric PNG rendering of frames.

use crate::error::GridError;
use crate::frame::Frame;
use crate::palette::Rgba;
use image::{ImageBuffer, ImageFormat, Rgba as Pixel, RgbaImage};
use std::io::Cursor;

/// Largest image either renderer will allocate, in pixels.
pub const MAX_IMAGE_PIXELS: u64 = 1 << 26;

/// Brightness of the left and right cube faces in isometric renders.
const LEFT_FACE_SHADE: f32 = 0.75;
const RIGHT_FACE_SHADE: f32 = 0.5;

fn color_of(colors: &[Rgba], index: u8) -> Result<Rgba, GridError> {
    colors
        .get(index as usize)
        .copied()
        .ok_or(GridError::IndexOutOfRange {
            index,
            len: colors.len(),
        })
}

/// Allocates a blank canvas, refusing sizes past [`MAX_IMAGE_PIXELS`].
fn canvas(width: u64, height: u64) -> Result<RgbaImage, GridError> {
    if width.saturating_mul(height) > MAX_IMAGE_PIXELS {
        return Err(GridError::ImageTooLarge { width, height });
    }
    // Both sides are bounded by the pixel limit, so they fit in u32
    Ok(ImageBuffer::new(width as u32, height as u32))
}

/// Renders a single-layer frame; each cell becomes a `pixel_size` square.
///
/// Only layer `z = 0` is drawn.
pub fn render_flat(frame: &Frame, colors: &[Rgba], pixel_size: u32) -> Result<RgbaImage, GridError> {
    let extents = frame.extents();
    let scale = pixel_size.max(1);
    let mut img = canvas(
        (extents.x as u64).saturating_mul(u64::from(scale)),
        (extents.y as u64).saturating_mul(u64::from(scale)),
    )?;

    for y in 0..extents.y {
        for x in 0..extents.x {
            let color = Pixel(color_of(colors, frame.cell(x, y, 0))?.channels());
            for dy in 0..scale {
                for dx in 0..scale {
                    img.put_pixel(x as u32 * scale + dx, y as u32 * scale + dy, color);
                }
            }
        }
    }

    Ok(img)
}

/// Renders a volume as shaded isometric cubes. Cells holding index 0 are empty.
///
/// The block size is `pixel_size` rounded up to an even number (minimum 2).
/// Cubes are painted back to front: by layer, then by `x + y`.
pub fn render_isometric(
    frame: &Frame,
    colors: &[Rgba],
    pixel_size: u32,
) -> Result<RgbaImage, GridError> {
    let extents = frame.extents();
    let block = (u64::from(pixel_size.max(2)) + 1) & !1;
    let diagonal_cells = (extents.x as u64).saturating_add(extents.y as u64);
    let width = diagonal_cells.saturating_mul(block);
    let height = diagonal_cells
        .saturating_sub(2)
        .saturating_mul(block / 2)
        .saturating_add((extents.z as u64).saturating_add(1).saturating_mul(block));
    let mut img = canvas(width, height)?;

    let b = block as i64;
    let (my, mz) = (extents.y as i64, extents.z as i64);

    for z in 0..extents.z {
        for diagonal in 0..(extents.x + extents.y).saturating_sub(1) {
            for x in 0..extents.x {
                if diagonal < x || diagonal - x >= extents.y {
                    continue;
                }
                let y = diagonal - x;
                let value = frame.cell(x, y, z);
                if value == 0 {
                    continue;
                }
                let color = color_of(colors, value)?;

                let ox = (x as i64 - y as i64) * b + my * b;
                let oy = (x as i64 + y as i64) * b / 2 + (mz - 1 - z as i64) * b;
                draw_cube(&mut img, ox, oy, b, color);
            }
        }
    }

    Ok(img)
}

/// Paints one cube whose top vertex sits at `(ox, oy)`.
fn draw_cube(img: &mut RgbaImage, ox: i64, oy: i64, b: i64, color: Rgba) {
    let top = Pixel(color.channels());
    let left = Pixel(color.shade(LEFT_FACE_SHADE).channels());
    let right = Pixel(color.shade(RIGHT_FACE_SHADE).channels());
    let half = b / 2;

    // Top diamond
    for dy in 0..b {
        let span = if dy < half { (dy + 1) * 2 } else { (b - dy) * 2 };
        for dx in -span..span {
            put(img, ox + dx, oy + dy, top);
        }
    }

    // Left and right faces
    for dx in 0..b {
        let left_top = oy + half + dx / 2 + 1;
        let right_top = oy + b - dx / 2;
        for dy in 0..b {
            put(img, ox - b + dx, left_top + dy, left);
            put(img, ox + dx, right_top + dy, right);
        }
    }
}

fn put(img: &mut RgbaImage, x: i64, y: i64, pixel: Pixel<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, pixel);
    }
}

/// Serializes an image to PNG bytes.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, GridError> {
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, ImageFormat::Png)?;
    Ok(bytes.into_inner())
}
