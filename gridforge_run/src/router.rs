//! Output routing: picks an encoder per frame and names the artifact.
//!
//! | Condition                       | Encoding          | Artifact          |
//! |---------------------------------|-------------------|-------------------|
//! | text dump requested             | text protocol     | standard output   |
//! | Z = 1                           | flat raster       | `{stem}.png`      |
//! | Z > 1 and isometric forced      | isometric raster  | `{stem}.png`      |
//! | Z > 1 otherwise                 | voxel volume      | `{stem}.vox`      |

use crate::config::RunConfig;
use crate::driver::FrameSink;
use crate::error::RunError;
use gridforge_core::{raster, textdump, voxel, Extents, Frame, Palette};
use gridforge_env::ArtifactStore;
use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

/// Artifact encoding chosen for a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Raster,
    Isometric,
    Voxel,
    TextDump,
}

impl Encoding {
    /// File extension, or `None` for the text dump.
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            Encoding::Raster | Encoding::Isometric => Some("png"),
            Encoding::Voxel => Some("vox"),
            Encoding::TextDump => None,
        }
    }
}

/// Decides how a frame with the given extents is encoded.
pub fn select_encoding(extents: Extents, isometric: bool, text_dump: bool) -> Encoding {
    if text_dump {
        Encoding::TextDump
    } else if extents.is_flat() {
        Encoding::Raster
    } else if isometric {
        Encoding::Isometric
    } else {
        Encoding::Voxel
    }
}

/// Artifact file stem, decided by the run driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactName {
    /// Non-animated run: `{model}_{seed}`
    Seeded { model: String, seed: u64 },
    /// Animated run: monotonic frame counter
    Sequence(u64),
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactName::Seeded { model, seed } => write!(f, "{}_{}", model, seed),
            ArtifactName::Sequence(counter) => write!(f, "{}", counter),
        }
    }
}

/// Encodes frames and hands the bytes to an [`ArtifactStore`], or writes
/// the text protocol to `out`.
pub struct OutputRouter<'a, S: ArtifactStore, W: Write> {
    store: &'a mut S,
    out: W,
    output_dir: PathBuf,
    palette: Palette,
    pixel_size: u32,
    isometric: bool,
    text_dump: bool,
    model_name: String,
    dir_ready: bool,
}

impl<'a, S: ArtifactStore, W: Write> OutputRouter<'a, S, W> {
    /// Creates a router for one model run with its resolved palette.
    pub fn new(store: &'a mut S, out: W, config: &RunConfig, palette: Palette) -> Self {
        Self {
            store,
            out,
            output_dir: config.output_dir.clone(),
            palette,
            pixel_size: config.pixel_size,
            isometric: config.isometric,
            text_dump: config.text_dump,
            model_name: config.model_name.clone(),
            dir_ready: false,
        }
    }

    /// Encodes one frame. Returns the artifact path, or `None` for the text dump.
    pub fn route(&mut self, frame: &Frame, name: &ArtifactName) -> Result<Option<PathBuf>, RunError> {
        let encoding = select_encoding(frame.extents(), self.isometric, self.text_dump);

        let bytes = match encoding {
            Encoding::TextDump => {
                textdump::write_text_dump(frame, &mut self.out).map_err(RunError::TextDump)?;
                return Ok(None);
            }
            Encoding::Raster => {
                let colors = self.palette.color_table(frame.legend())?;
                let img = raster::render_flat(frame, &colors, self.pixel_size)?;
                raster::encode_png(&img)?
            }
            Encoding::Isometric => {
                let colors = self.palette.color_table(frame.legend())?;
                let img = raster::render_isometric(frame, &colors, self.pixel_size)?;
                raster::encode_png(&img)?
            }
            Encoding::Voxel => {
                let colors = self.palette.color_table(frame.legend())?;
                voxel::encode_vox(frame, &colors)?
            }
        };

        if !self.dir_ready {
            self.store.ensure_dir(&self.output_dir)?;
            self.dir_ready = true;
        }

        let extension = encoding.extension().unwrap_or("bin");
        let path = self.output_dir.join(format!("{}.{}", name, extension));
        self.store.write(&path, &bytes)?;
        debug!("Wrote {:?} artifact {}", encoding, path.display());
        Ok(Some(path))
    }
}

impl<S: ArtifactStore, W: Write> FrameSink for OutputRouter<'_, S, W> {
    fn accept(&mut self, frame: Frame, name: &ArtifactName) -> Result<Option<PathBuf>, RunError> {
        self.route(&frame, name)
    }

    fn iteration_complete(&mut self, iteration: usize, seed: u64) {
        info!("✓ {} iteration {} DONE (seed={})", self.model_name, iteration, seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridforge_core::{GridError, Legend, Rgba, Symbol};
    use gridforge_env::MemoryStore;
    use proptest::prelude::*;
    use std::path::Path;

    fn palette() -> Palette {
        let mut palette = Palette::new();
        palette.insert(Symbol::new('A').unwrap(), Rgba(0xFF000000));
        palette.insert(Symbol::new('B').unwrap(), Rgba(0xFFFFFFFF));
        palette
    }

    fn config() -> RunConfig {
        RunConfig {
            model_name: "Test".to_string(),
            output_dir: PathBuf::from("out"),
            seed: None,
            steps: 10,
            amount: 1,
            pixel_size: 1,
            animate: false,
            isometric: false,
            text_dump: false,
        }
    }

    fn frame(extents: Extents) -> Frame {
        let mut state = vec![0u8; extents.volume()];
        state[0] = 1;
        Frame::new(state, Legend::parse("AB").unwrap(), extents).unwrap()
    }

    fn seeded(seed: u64) -> ArtifactName {
        ArtifactName::Seeded {
            model: "Test".to_string(),
            seed,
        }
    }

    #[test]
    fn test_selection_table() {
        let flat = Extents::new(4, 4, 1);
        let volume = Extents::new(4, 4, 4);
        assert_eq!(select_encoding(flat, false, false), Encoding::Raster);
        assert_eq!(select_encoding(flat, true, false), Encoding::Raster);
        assert_eq!(select_encoding(volume, true, false), Encoding::Isometric);
        assert_eq!(select_encoding(volume, false, false), Encoding::Voxel);
        assert_eq!(select_encoding(volume, false, true), Encoding::TextDump);
        assert_eq!(select_encoding(flat, true, true), Encoding::TextDump);
    }

    proptest! {
        #[test]
        fn prop_flat_frames_never_become_voxels(
            x in 1usize..2048,
            y in 1usize..2048,
            isometric in any::<bool>(),
        ) {
            let encoding = select_encoding(Extents::new(x, y, 1), isometric, false);
            prop_assert_eq!(encoding, Encoding::Raster);
        }
    }

    #[test]
    fn test_artifact_names() {
        assert_eq!(seeded(1234).to_string(), "Test_1234");
        assert_eq!(ArtifactName::Sequence(17).to_string(), "17");
    }

    #[test]
    fn test_flat_frame_writes_png() {
        let mut store = MemoryStore::new();
        let mut router = OutputRouter::new(&mut store, Vec::new(), &config(), palette());
        let path = router.route(&frame(Extents::new(2, 2, 1)), &seeded(5)).unwrap();
        assert_eq!(path, Some(PathBuf::from("out/Test_5.png")));
        assert!(store.has_dir(Path::new("out")));
        let bytes = store.get(Path::new("out/Test_5.png")).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[test]
    fn test_volume_writes_vox_or_isometric_png() {
        let mut store = MemoryStore::new();
        let mut router = OutputRouter::new(&mut store, Vec::new(), &config(), palette());
        let path = router.route(&frame(Extents::new(3, 3, 3)), &ArtifactName::Sequence(0)).unwrap();
        assert_eq!(path, Some(PathBuf::from("out/0.vox")));

        let mut iso = config();
        iso.isometric = true;
        let mut router = OutputRouter::new(&mut store, Vec::new(), &iso, palette());
        let path = router.route(&frame(Extents::new(3, 3, 3)), &ArtifactName::Sequence(1)).unwrap();
        assert_eq!(path, Some(PathBuf::from("out/1.png")));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_oversized_volume_is_rejected() {
        let mut store = MemoryStore::new();
        let mut router = OutputRouter::new(&mut store, Vec::new(), &config(), palette());
        let result = router.route(&frame(Extents::new(300, 1, 2)), &seeded(1));
        assert!(matches!(
            result,
            Err(RunError::Grid(GridError::VoxelExtentOutOfRange { axis: 'X', value: 300 }))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_oversized_pixel_scale_fails_frame() {
        let mut store = MemoryStore::new();
        let mut huge = config();
        huge.pixel_size = 3_000_000_000;
        let mut router = OutputRouter::new(&mut store, Vec::new(), &huge, palette());
        let result = router.route(&frame(Extents::new(4, 4, 1)), &seeded(1));
        assert!(matches!(
            result,
            Err(RunError::Grid(GridError::ImageTooLarge { .. }))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_unknown_symbol_fails_frame() {
        let mut store = MemoryStore::new();
        let mut router = OutputRouter::new(&mut store, Vec::new(), &config(), Palette::new());
        let result = router.route(&frame(Extents::new(2, 2, 1)), &seeded(1));
        assert!(matches!(result, Err(RunError::Grid(GridError::UnknownSymbol('A')))));
    }

    #[test]
    fn test_override_color_reaches_pixels() {
        let mut overrides = gridforge_core::ColorOverrides::new();
        overrides.insert(Symbol::new('B').unwrap(), Rgba(0xFFFF004D));
        let resolved = palette().with_overrides(&overrides);

        let f = frame(Extents::new(2, 1, 1));
        let colors = resolved.color_table(f.legend()).unwrap();
        let img = raster::render_flat(&f, &colors, 1).unwrap();
        assert_eq!(img.get_pixel(0, 0).0, [0xFF, 0x00, 0x4D, 0xFF]);
        assert_eq!(img.get_pixel(1, 0).0, [0x00, 0x00, 0x00, 0xFF]);
    }

    #[test]
    fn test_text_dump_bypasses_files() {
        let mut store = MemoryStore::new();
        let mut out = Vec::new();
        let mut text = config();
        text.text_dump = true;

        let f = Frame::new(vec![0, 1, 1, 0], Legend::parse("AB").unwrap(), Extents::new(2, 2, 1))
            .unwrap();
        let mut router = OutputRouter::new(&mut store, &mut out, &text, Palette::new());
        assert_eq!(router.route(&f, &seeded(1)).unwrap(), None);
        drop(router);

        assert!(store.is_empty());
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "GRID_START 2 2 1\nLEGEND AB\nLAYER 0\nAB\nBA\nGRID_END\n"
        );
    }
}
