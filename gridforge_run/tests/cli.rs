use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const PALETTE: &str = "[colors]\nB = \"000000\"\nW = \"FFF1E8\"\n";

const GROWTH: &str = r#"
values = "BW"
size = 5
origin = true
steps = 6

[[nodes]]
kind = "one"
rotate = true
rules = [{ input = "WB", output = "WW" }]
"#;

/// Lays out a resource root; `palette` false leaves the palette out.
fn resources(root: &Path, palette: bool, index: &str) {
    fs::create_dir_all(root.join("models")).unwrap();
    if palette {
        fs::write(root.join("palette.toml"), PALETTE).unwrap();
    }
    fs::write(root.join("models.toml"), index).unwrap();
    fs::write(root.join("models/Growth.toml"), GROWTH).unwrap();
    fs::write(root.join("models/Broken.toml"), "values = \"BW\"\nd = 9\nsize = 3\n").unwrap();
}

fn gridforge(workdir: &Path, root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gridforge"))
        .args(args)
        .current_dir(workdir)
        .env("GRIDFORGE_RESOURCES", root)
        .env("RUST_LOG", "warn")
        .output()
        .unwrap()
}

#[test]
fn help_exits_zero() {
    let tmp = tempfile::tempdir().unwrap();
    let out = gridforge(tmp.path(), &tmp.path().join("none"), &["--help"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&out.stdout).contains("--pixelsize"));
}

#[test]
fn single_model_writes_artifact() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("resources");
    resources(&root, true, "");
    let model = root.join("models/Growth.toml");

    let out = gridforge(
        tmp.path(),
        &root,
        &[model.to_str().unwrap(), "-s", "4", "-o", "renders"],
    );
    assert_eq!(out.status.code(), Some(0));
    assert!(tmp.path().join("renders/Growth_4.png").is_file());
}

#[test]
fn missing_model_file_exits_one() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("resources");
    resources(&root, true, "");

    let out = gridforge(tmp.path(), &root, &["NoSuchModel.toml"]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn missing_palette_exits_one() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("resources");
    resources(&root, false, "[[models]]\nname = \"Growth\"\n");
    let model = root.join("models/Growth.toml");

    let out = gridforge(tmp.path(), &root, &[model.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));

    // Batch mode fails before running anything
    let out = gridforge(tmp.path(), &root, &[]);
    assert_eq!(out.status.code(), Some(1));
    assert!(!tmp.path().join("output").exists());
}

#[test]
fn batch_with_broken_model_exits_one_after_running_the_rest() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("resources");
    resources(
        &root,
        true,
        "[[models]]\nname = \"Broken\"\n\n[[models]]\nname = \"Growth\"\nseeds = [6]\n",
    );

    let out = gridforge(tmp.path(), &root, &[]);
    assert_eq!(out.status.code(), Some(1));
    assert!(tmp.path().join("output/Growth_6.png").is_file());
}

#[test]
fn clean_batch_exits_zero() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("resources");
    resources(&root, true, "[[models]]\nname = \"Growth\"\nseeds = [1]\n");

    let out = gridforge(tmp.path(), &root, &[]);
    assert_eq!(out.status.code(), Some(0));
    assert!(tmp.path().join("output/Growth_1.png").is_file());
}

#[test]
fn text_dump_keeps_stdout_clean() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("resources");
    resources(&root, true, "");
    let model = root.join("models/Growth.toml");

    let out = gridforge(
        tmp.path(),
        &root,
        &[model.to_str().unwrap(), "--stdout", "-s", "2"],
    );
    assert_eq!(out.status.code(), Some(0));

    let stdout = String::from_utf8(out.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "GRID_START 5 5 1");
    assert_eq!(lines[1], "LEGEND BW");
    assert_eq!(lines[2], "LAYER 0");
    assert_eq!(lines.len(), 3 + 5 + 1);
    assert!(lines[3..8].iter().all(|row| row.len() == 5));
    assert!(stdout.ends_with("GRID_END\n"));
    assert!(!tmp.path().join("output").exists());
}
