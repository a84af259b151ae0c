use gridforge_core::{Palette, RewriteInterpreter};
use gridforge_env::{FsStore, SeededEntropy};
use gridforge_run::{run_batch, Resources};
use std::fs;
use std::path::Path;

const PALETTE: &str = r#"
[colors]
B = "000000"
W = "FFF1E8"
R = "FF004D"
"#;

const GROWTH: &str = r#"
values = "BW"
size = 6
origin = true
steps = 10

[[nodes]]
kind = "one"
rotate = true
rules = [{ input = "WB", output = "WW" }]
"#;

const CUBE: &str = r#"
values = "BR"
size = 4
d = 3
origin = true
seeds = [5]

[[nodes]]
kind = "all"
rules = [{ input = "RB", output = "RR" }]
"#;

fn write_resources(root: &Path, index: &str) {
    fs::create_dir_all(root.join("models")).unwrap();
    fs::write(root.join("palette.toml"), PALETTE).unwrap();
    fs::write(root.join("models.toml"), index).unwrap();
    fs::write(root.join("models/Growth.toml"), GROWTH).unwrap();
    fs::write(root.join("models/Cube.toml"), CUBE).unwrap();
    fs::write(root.join("models/Broken.toml"), "values = \"BW\"\nsize = \n").unwrap();
}

#[test]
fn failing_second_model_does_not_stop_batch() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("resources");
    let output = tmp.path().join("output");
    write_resources(
        &root,
        r#"
[[models]]
name = "Growth"
seeds = [3]

[[models]]
name = "Broken"

[[models]]
name = "Missing"

[[models]]
name = "Cube"
"#,
    );

    let resources = Resources::new(&root);
    let palette = Palette::load(&resources.palette_path()).unwrap();
    let report = run_batch(
        &resources,
        &output,
        &palette,
        &RewriteInterpreter::new(),
        &mut SeededEntropy::new(1),
        &mut FsStore::new(),
    )
    .unwrap();

    let completed: Vec<&str> = report.completed.iter().map(|s| s.model.as_str()).collect();
    assert_eq!(completed, vec!["Growth", "Cube"]);
    let failed: Vec<&str> = report.failed.iter().map(|f| f.model.as_str()).collect();
    assert_eq!(failed, vec!["Broken", "Missing"]);
    assert!(!report.is_success());

    assert!(output.join("Growth_3.png").is_file());
    assert!(output.join("Cube_5.vox").is_file());
}

#[test]
fn oversized_model_is_recorded_not_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("resources");
    let output = tmp.path().join("output");
    write_resources(
        &root,
        r#"
[[models]]
name = "Growth"
seeds = [2]

[[models]]
name = "Huge"

[[models]]
name = "Cube"
"#,
    );
    fs::write(
        root.join("models/Huge.toml"),
        "values = \"BW\"\nsize = 5000000\nd = 3\n",
    )
    .unwrap();

    let resources = Resources::new(&root);
    let palette = Palette::load(&resources.palette_path()).unwrap();
    let report = run_batch(
        &resources,
        &output,
        &palette,
        &RewriteInterpreter::new(),
        &mut SeededEntropy::new(1),
        &mut FsStore::new(),
    )
    .unwrap();

    let completed: Vec<&str> = report.completed.iter().map(|s| s.model.as_str()).collect();
    assert_eq!(completed, vec!["Growth", "Cube"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].model, "Huge");
    assert!(report.failed[0].reason.contains("exceeds the limit"));
    assert!(output.join("Growth_2.png").is_file());
}

#[test]
fn batch_clears_stale_artifacts() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("resources");
    let output = tmp.path().join("output");
    write_resources(&root, "[[models]]\nname = \"Growth\"\nseeds = [8]\n");
    fs::create_dir_all(&output).unwrap();
    fs::write(output.join("stale.png"), b"old").unwrap();

    let resources = Resources::new(&root);
    let palette = Palette::load(&resources.palette_path()).unwrap();
    let report = run_batch(
        &resources,
        &output,
        &palette,
        &RewriteInterpreter::new(),
        &mut SeededEntropy::new(1),
        &mut FsStore::new(),
    )
    .unwrap();

    assert!(report.is_success());
    assert!(!output.join("stale.png").exists());
    let png = fs::read(output.join("Growth_8.png")).unwrap();
    assert_eq!(&png[1..4], b"PNG");
}

#[test]
fn index_overrides_model_attributes() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("resources");
    let output = tmp.path().join("output");
    write_resources(
        &root,
        "[[models]]\nname = \"Cube\"\niso = true\npixelsize = 2\n",
    );

    let resources = Resources::new(&root);
    let palette = Palette::load(&resources.palette_path()).unwrap();
    let report = run_batch(
        &resources,
        &output,
        &palette,
        &RewriteInterpreter::new(),
        &mut SeededEntropy::new(1),
        &mut FsStore::new(),
    )
    .unwrap();

    assert_eq!(report.completed.len(), 1);
    assert!(output.join("Cube_5.png").is_file());
    assert!(!output.join("Cube_5.vox").exists());
}

#[test]
fn missing_index_aborts_batch() {
    let tmp = tempfile::tempdir().unwrap();
    let resources = Resources::new(tmp.path());
    let result = run_batch(
        &resources,
        &tmp.path().join("output"),
        &Palette::new(),
        &RewriteInterpreter::new(),
        &mut SeededEntropy::new(1),
        &mut FsStore::new(),
    );
    assert!(result.is_err());
}
