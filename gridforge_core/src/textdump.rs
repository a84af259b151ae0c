//! Plain-text grid dump for consumption by another process.
//!
//! ```text
//! GRID_START <X> <Y> <Z>
//! LEGEND <symbols>
//! LAYER <z>
//! <Y rows of exactly X characters>
//! ...
//! GRID_END
//! ```
//!
//! Cell values outside the legend are written as a space.

use crate::frame::Frame;
use std::io::{self, Write};

/// Writes one frame in the text protocol.
pub fn write_text_dump<W: Write>(frame: &Frame, out: &mut W) -> io::Result<()> {
    let extents = frame.extents();
    let legend = frame.legend();

    writeln!(out, "GRID_START {} {} {}", extents.x, extents.y, extents.z)?;
    writeln!(out, "LEGEND {}", legend)?;

    let mut row = String::with_capacity(extents.x);
    for z in 0..extents.z {
        writeln!(out, "LAYER {}", z)?;
        for y in 0..extents.y {
            row.clear();
            for x in 0..extents.x {
                let c = legend.get(frame.cell(x, y, z)).map_or(' ', |s| s.as_char());
                row.push(c);
            }
            writeln!(out, "{}", row)?;
        }
    }

    writeln!(out, "GRID_END")?;
    out.flush()
}
