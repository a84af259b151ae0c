//! MagicaVoxel (`.vox`, version 150) volume encoding.
//!
//! ```text
//! "VOX " 150
//! MAIN
//! ├── SIZE   x, y, z                      (i32 each)
//! ├── XYZI   n, then n × (x, y, z, index) (u8 each)
//! └── RGBA   256 × (r, g, b, a)
//! ```
//!
//! Cells with index 0 are empty and not written. The RGBA chunk is shifted
//! by one: entry `i` holds the color of voxel index `i + 1`.

use crate::error::GridError;
use crate::frame::Frame;
use crate::palette::Rgba;

const VOX_VERSION: i32 = 150;
const PALETTE_ENTRIES: usize = 256;

/// Checks one extent against the format's 8-bit coordinate range.
fn checked_extent(axis: char, value: usize) -> Result<u8, GridError> {
    u8::try_from(value).map_err(|_| GridError::VoxelExtentOutOfRange { axis, value })
}

fn write_chunk(out: &mut Vec<u8>, id: &[u8; 4], content: &[u8], children: &[u8]) {
    out.extend_from_slice(id);
    out.extend_from_slice(&(content.len() as i32).to_le_bytes());
    out.extend_from_slice(&(children.len() as i32).to_le_bytes());
    out.extend_from_slice(content);
    out.extend_from_slice(children);
}

/// Encodes a frame as `.vox` bytes.
///
/// Every extent must fit in 0-255; larger grids are rejected before any
/// bytes are produced.
pub fn encode_vox(frame: &Frame, colors: &[Rgba]) -> Result<Vec<u8>, GridError> {
    let extents = frame.extents();
    let mx = checked_extent('X', extents.x)?;
    let my = checked_extent('Y', extents.y)?;
    let mz = checked_extent('Z', extents.z)?;

    let mut voxels: Vec<[u8; 4]> = Vec::new();
    for z in 0..mz {
        for y in 0..my {
            for x in 0..mx {
                let value = frame.cell(x as usize, y as usize, z as usize);
                if value == 0 {
                    continue;
                }
                if value as usize >= colors.len() {
                    return Err(GridError::IndexOutOfRange {
                        index: value,
                        len: colors.len(),
                    });
                }
                voxels.push([x, y, z, value]);
            }
        }
    }

    let mut size = Vec::with_capacity(12);
    for extent in [mx, my, mz] {
        size.extend_from_slice(&(extent as i32).to_le_bytes());
    }

    let mut xyzi = Vec::with_capacity(4 + voxels.len() * 4);
    xyzi.extend_from_slice(&(voxels.len() as i32).to_le_bytes());
    for voxel in &voxels {
        xyzi.extend_from_slice(voxel);
    }

    let mut rgba = Vec::with_capacity(PALETTE_ENTRIES * 4);
    for entry in 0..PALETTE_ENTRIES {
        let channels = colors.get(entry + 1).map_or([0; 4], |c| c.channels());
        rgba.extend_from_slice(&channels);
    }

    let mut children = Vec::new();
    write_chunk(&mut children, b"SIZE", &size, &[]);
    write_chunk(&mut children, b"XYZI", &xyzi, &[]);
    write_chunk(&mut children, b"RGBA", &rgba, &[]);

    let mut out = Vec::with_capacity(8 + 12 + children.len());
    out.extend_from_slice(b"VOX ");
    out.extend_from_slice(&VOX_VERSION.to_le_bytes());
    write_chunk(&mut out, b"MAIN", &[], &children);
    Ok(out)
}
