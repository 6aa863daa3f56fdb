#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CASTLE: &str = r#"constant game_title "Test Castle"

location hall : great hall
object me : myself
  player
object lamp : brass lamp

grammar look >look
grammar take *present >take

{+intro
write "Welcome to the castle.^"
}

{+look
write "You are in the great hall.^"
}

{+take
move noun1 to player
write "Taken.^"
}
"#;

/// A temp directory holding `game.j2` with the given source.
fn game_dir(source: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let game = dir.path().join("game.j2");
    fs::write(&game, source).unwrap();
    (dir, game)
}

fn jacl() -> Command {
    Command::cargo_bin("jacl").unwrap()
}

// ---------------------------------------------------------------------------
// play
// ---------------------------------------------------------------------------

#[test]
fn play_runs_commands_until_input_ends() {
    let (_dir, game) = game_dir(CASTLE);
    jacl()
        .arg(&game)
        .args(["--seed", "1"])
        .write_stdin("look\ntake lamp\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Welcome to the castle."))
        .stdout(predicate::str::contains("You are in the great hall."))
        .stdout(predicate::str::contains("Taken."));
}

#[test]
fn play_quit_asks_for_confirmation() {
    let (_dir, game) = game_dir(CASTLE);
    jacl()
        .arg(&game)
        .write_stdin("quit\nyes\nlook\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Are you sure you want to quit?"))
        .stdout(predicate::str::contains("You are in the great hall.").not());
}

#[test]
fn play_replays_a_walkthrough_file() {
    let (dir, game) = game_dir(CASTLE);
    fs::write(dir.path().join("game.walkthru"), "look\ntake lamp\n").unwrap();
    jacl()
        .arg(&game)
        .write_stdin("walkthru\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Taken."));
}

#[test]
fn play_missing_file_fails_to_load() {
    let dir = TempDir::new().unwrap();
    jacl()
        .arg(dir.path().join("absent.j2"))
        .assert()
        .code(48)
        .stderr(predicate::str::contains("cannot access"));
}

#[test]
fn play_without_a_player_fails() {
    let (_dir, game) = game_dir("location hall : great hall\n");
    jacl().arg(&game).assert().code(43);
}

#[test]
fn play_without_a_game_is_a_usage_error() {
    jacl()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no game file given"));
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_valid_game() {
    let (_dir, game) = game_dir(CASTLE);
    jacl()
        .arg("check")
        .arg(&game)
        .assert()
        .success()
        .stdout(predicate::str::contains("All checks passed for 'Test Castle'"))
        .stdout(predicate::str::contains("3 objects"));
}

#[test]
fn check_reports_load_errors() {
    let source = format!("{CASTLE}constant broken\n");
    let (_dir, game) = game_dir(&source);
    jacl()
        .arg("check")
        .arg(&game)
        .assert()
        .code(48)
        .stderr(predicate::str::contains("constant \"broken\" has no value"))
        .stderr(predicate::str::contains("1 error"));
}

// ---------------------------------------------------------------------------
// objects
// ---------------------------------------------------------------------------

#[test]
fn objects_lists_everything() {
    let (_dir, game) = game_dir(CASTLE);
    jacl()
        .arg("objects")
        .arg(&game)
        .assert()
        .success()
        .stdout(predicate::str::contains("lamp"))
        .stdout(predicate::str::contains("LOCATION"))
        .stdout(predicate::str::contains("3 objects"));
}

#[test]
fn objects_filters_locations() {
    let (_dir, game) = game_dir(CASTLE);
    jacl()
        .args(["objects", "--locations"])
        .arg(&game)
        .assert()
        .success()
        .stdout(predicate::str::contains("hall"))
        .stdout(predicate::str::contains("lamp").not())
        .stdout(predicate::str::contains("1 objects"));
}

// ---------------------------------------------------------------------------
// export
// ---------------------------------------------------------------------------

#[test]
fn export_json_to_stdout() {
    let (_dir, game) = game_dir(CASTLE);
    let output = jacl().arg("export").arg(&game).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["game"]["title"], "Test Castle");
    assert_eq!(json["game"]["player"], "me");
    let labels: Vec<_> = json["objects"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["label"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(labels, vec!["hall", "me", "lamp"]);
}

#[test]
fn export_json_to_file() {
    let (dir, game) = game_dir(CASTLE);
    let out = dir.path().join("world.json");
    jacl()
        .arg("export")
        .arg(&game)
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported to"));

    let content = fs::read_to_string(&out).unwrap();
    assert!(content.contains("\"functions\""));
    assert!(content.contains("+intro"));
}

// ---------------------------------------------------------------------------
// preprocess
// ---------------------------------------------------------------------------

#[test]
fn preprocess_plain_output() {
    let (dir, game) = game_dir(CASTLE);
    jacl()
        .args(["preprocess", "--noencrypt"])
        .arg(&game)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));

    let content = fs::read_to_string(dir.path().join("game.processed")).unwrap();
    assert!(content.starts_with("#processed:"));
    assert!(content.contains("location hall : great hall"));
    assert!(!content.contains("\n\n"));
}

#[test]
fn preprocess_accepts_single_dash_flags() {
    let (dir, game) = game_dir(CASTLE);
    jacl()
        .args(["preprocess", "-noencrypt"])
        .arg(&game)
        .assert()
        .success();

    let content = fs::read_to_string(dir.path().join("game.processed")).unwrap();
    assert!(content.contains("location hall : great hall"));
}

#[test]
fn preprocess_encrypted_output_still_loads() {
    let (dir, game) = game_dir(CASTLE);
    let out = dir.path().join("castle.j2");
    jacl()
        .arg("preprocess")
        .arg(&game)
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let bytes = fs::read(&out).unwrap();
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("#encrypted"));
    assert!(!text.contains("great hall"));

    jacl()
        .arg("check")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Test Castle"));
}

#[test]
fn preprocess_missing_include_fails() {
    let (_dir, game) = game_dir("#include \"missing.j2\"\nlocation hall : hall\n");
    jacl().arg("preprocess").arg(&game).assert().code(200);
}
