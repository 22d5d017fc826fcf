//! End to end tests for the `warmonger` binary.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::json;

fn warmonger(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_warmonger"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run warmonger")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn write_world(dir: &Path) -> PathBuf {
    let path = dir.join("world.json");
    let world = json!({
        "name": "classic",
        "displayName": "Classic",
        "terrainTypes": [
            {"name": "grass", "displayName": "Grassland"},
            {"name": "water", "displayName": "Water"}
        ],
        "unitClasses": [
            {"name": "infantry", "movementPoints": 3, "movementCosts": {"grass": 1}}
        ],
        "unitTypes": [
            {"name": "spearman", "displayName": "Spearman", "class": "infantry", "hitPoints": 10}
        ]
    });
    std::fs::write(&path, world.to_string()).unwrap();
    path
}

fn write_line_map(dir: &Path) -> PathBuf {
    let path = dir.join("line.json");
    let map = json!({
        "name": "line",
        "world": "classic",
        "mapNodes": [
            {"name": "a", "terrainType": "grass"},
            {"name": "b", "terrainType": "grass"},
            {"name": "c", "terrainType": "grass"},
            {"name": "d", "terrainType": "water"}
        ],
        "connections": [
            {"from": "a", "to": "b", "axis": "WestEast"},
            {"from": "b", "to": "c", "axis": "WestEast"},
            {"from": "c", "to": "d", "axis": "WestEast"}
        ],
        "units": [
            {"name": "guard", "unitType": "spearman", "mapNode": "a"}
        ]
    });
    std::fs::write(&path, map.to_string()).unwrap();
    path
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_generate_then_check() {
    let dir = tempfile::tempdir().unwrap();
    let world = write_world(dir.path());
    let map = dir.path().join("generated.json");

    let output = warmonger(&[
        "generate",
        "--world",
        arg(&world),
        "--name",
        "skirmish",
        "--radius",
        "3",
        "--seed",
        "5",
        "--output",
        arg(&map),
    ]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("19 nodes, 42 connections"));

    let output = warmonger(&["check", "--world", arg(&world), "--map", arg(&map)]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("map `skirmish` is consistent"));
    assert!(stdout(&output).contains("12 edge nodes"));
}

#[test]
fn test_path_and_reach() {
    let dir = tempfile::tempdir().unwrap();
    let world = write_world(dir.path());
    let map = write_line_map(dir.path());

    let output = warmonger(&[
        "path", "--world", arg(&world), "--map", arg(&map), "--unit", "guard", "--to", "c",
    ]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "a -> b -> c");

    let output = warmonger(&[
        "path", "--world", arg(&world), "--map", arg(&map), "--unit", "guard", "--to", "d",
    ]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "no path");

    let output = warmonger(&["reach", "--world", arg(&world), "--map", arg(&map), "--unit", "guard"]);
    assert!(output.status.success());
    let lines: Vec<String> = stdout(&output).lines().map(str::to_string).collect();
    assert_eq!(lines, vec!["2 nodes reachable", "b", "c"]);
}

#[test]
fn test_errors_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let world = write_world(dir.path());
    let map = write_line_map(dir.path());

    let output = warmonger(&[
        "path", "--world", arg(&world), "--map", arg(&map), "--unit", "ghost", "--to", "c",
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no unit named `ghost`"));

    let missing = dir.path().join("missing.json");
    let output = warmonger(&["check", "--world", arg(&world), "--map", arg(&missing)]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to load map"));
}
