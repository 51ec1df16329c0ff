use std::{fs, path::PathBuf};

use tempfile::tempdir;

use storey_cli::{Args, run};

/// Collects all .json files from a directory
fn collect_json_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json")
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

/// Demos live at the workspace root, not in the crate
fn demos_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

fn args(input: &PathBuf, output: PathBuf) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: output.to_string_lossy().to_string(),
        config: None,
        textures: None,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let valid_demos = collect_json_files(demos_path());
    assert!(!valid_demos.is_empty(), "No valid demos found in demos/");

    let mut failed_demos = Vec::new();

    for demo_path in &valid_demos {
        let output_filename = format!("{}.glb", demo_path.file_stem().unwrap().to_string_lossy());
        let output_path = temp_dir.path().join(output_filename);

        match run(&args(demo_path, output_path.clone())) {
            Ok(()) => {
                let glb = fs::read(&output_path).expect("Output was not written");
                assert_eq!(&glb[0..4], b"glTF", "{} is not a GLB", output_path.display());
            }
            Err(e) => failed_demos.push((demo_path.clone(), e)),
        }
    }

    if !failed_demos.is_empty() {
        eprintln!("\nValid demos that failed:");
        for (path, err) in &failed_demos {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} valid demo(s) failed unexpectedly", failed_demos.len());
    }

    println!("✅ All {} valid demos passed", valid_demos.len());
}

#[test]
fn e2e_smoke_test_error_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let error_demos = collect_json_files(demos_path().join("errors"));
    assert!(
        !error_demos.is_empty(),
        "No error demos found in demos/errors/"
    );

    let mut unexpectedly_succeeded = Vec::new();

    for demo_path in &error_demos {
        let output_filename = format!(
            "error_{}.glb",
            demo_path.file_stem().unwrap().to_string_lossy()
        );
        let output_path = temp_dir.path().join(output_filename);

        if run(&args(demo_path, output_path.clone())).is_ok() {
            unexpectedly_succeeded.push(demo_path.clone());
        }
        assert!(
            !output_path.exists(),
            "{} wrote output despite failing",
            demo_path.display()
        );
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError demos that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error demo(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }

    println!(
        "✅ All {} error demos failed as expected",
        error_demos.len()
    );
}

#[test]
fn e2e_textures_flag_replaces_catalog() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = demos_path().join("textured_room.json");

    let catalog = temp_dir.path().join("catalog.json");
    fs::write(
        &catalog,
        r#"{"wall": {"bricks": {"uri": "textures/does-not-exist/bricks.png"}}}"#,
    )
    .unwrap();

    let mut with_catalog = args(&input, temp_dir.path().join("replaced.glb"));
    with_catalog.textures = Some(catalog.to_string_lossy().to_string());
    let err = run(&with_catalog).expect_err("Replaced catalog points at a missing file");
    assert!(err.to_string().contains("bricks.png"));

    fs::write(&catalog, "{}").unwrap();
    let output = temp_dir.path().join("untextured.glb");
    let mut without_textures = args(&input, output.clone());
    without_textures.textures = Some(catalog.to_string_lossy().to_string());
    run(&without_textures).expect("An empty catalog exports plain colors");

    let textured = temp_dir.path().join("textured.glb");
    run(&args(&input, textured.clone())).unwrap();
    assert!(fs::metadata(&textured).unwrap().len() > fs::metadata(&output).unwrap().len());
}
