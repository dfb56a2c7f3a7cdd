use std::{fs, path::PathBuf};

use tempfile::tempdir;

use metroline_cli::{Args, CliError, ModeArg, run};

/// Collects all .toml network files from a directory
fn collect_network_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("toml")
            })
            .collect()
    } else {
        Vec::new()
    };

    files.sort();
    files
}

fn demos_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

fn args(input: &PathBuf, output: &PathBuf, mode: Option<ModeArg>) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: output.to_string_lossy().to_string(),
        config: None,
        mode,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_demo_networks() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let networks = collect_network_files(demos_path());

    assert!(!networks.is_empty(), "No demo networks found in demos/");

    let mut failed = Vec::new();
    for network in &networks {
        for mode in [ModeArg::Linear, ModeArg::Grid] {
            let output_path = temp_dir.path().join(format!(
                "{}-{mode:?}.toml",
                network.file_stem().unwrap().to_string_lossy()
            ));

            if let Err(e) = run(&args(network, &output_path, Some(mode))) {
                failed.push((network.clone(), mode, e));
                continue;
            }

            let written = fs::read_to_string(&output_path).expect("output was written");
            let layout: toml::Table = toml::from_str(&written).expect("output is valid TOML");
            let vertices = layout["vertices"].as_array().expect("vertices listed");
            assert!(!vertices.is_empty(), "{} has no vertices", network.display());
            assert!(layout["edges"].as_array().is_some_and(|edges| !edges.is_empty()));
        }
    }

    if !failed.is_empty() {
        eprintln!("\nDemo networks that failed:");
        for (path, mode, err) in &failed {
            eprintln!("  - {} ({mode:?}): {}", path.display(), err);
        }
        panic!("{} demo layout(s) failed unexpectedly", failed.len());
    }
}

#[test]
fn e2e_walk_transfer_collapses() {
    let temp_dir = tempdir().unwrap();
    let input = demos_path().join("walk_transfer.toml");
    let output = temp_dir.path().join("walk.toml");

    run(&args(&input, &output, None)).expect("layout succeeds");

    let layout: toml::Table = toml::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(layout["merged"].as_integer(), Some(1));
    let ids: Vec<&str> = layout["vertices"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v["id"].as_str())
        .collect();
    assert!(ids.contains(&"a2+b1"), "merged vertex missing from {ids:?}");
}

#[test]
fn e2e_invalid_network_is_reported() {
    let temp_dir = tempdir().unwrap();
    let input = temp_dir.path().join("broken.toml");
    fs::write(&input, "[[edges]]\nid = \"x\"\nfrom = \"a\"\nto = \"b\"\n").unwrap();
    let output = temp_dir.path().join("out.toml");

    let err = run(&args(&input, &output, None)).unwrap_err();
    assert!(matches!(err, CliError::Network(_)));
    assert!(!output.exists());
}

#[test]
fn e2e_missing_input_file() {
    let temp_dir = tempdir().unwrap();
    let input = temp_dir.path().join("absent.toml");
    let output = temp_dir.path().join("out.toml");

    assert!(matches!(
        run(&args(&input, &output, None)),
        Err(CliError::Io(_))
    ));
}
