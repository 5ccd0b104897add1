use assert_cmd::prelude::*;
use predicates::str::contains;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn cube_room() -> Command {
    Command::cargo_bin("cube-room").expect("binary exists")
}

#[test]
fn summary_mode_reports_scene_contents() {
    let mut cmd = cube_room();
    cmd.arg("--summary-only");
    cmd.assert()
        .success()
        .stdout(contains("Scene ready: 1 cube, 6 grid panels, 2 lights"))
        .stdout(contains("Camera aspect 1.3333"))
        .stdout(contains("Final cube rotation=(0.00, 0.00)"));
}

#[test]
fn hundred_frames_accumulate_one_radian() {
    let mut cmd = cube_room();
    cmd.args(["--summary-only", "--frames", "100"]);
    cmd.assert()
        .success()
        .stdout(contains("Advanced 100 frame(s)"))
        .stdout(contains("Final cube rotation=(1.00, 1.00)"));
}

#[test]
fn resize_flags_change_the_reported_aspect() {
    let mut cmd = cube_room();
    cmd.args(["--summary-only", "--width", "1280", "--height", "720"]);
    cmd.assert()
        .success()
        .stdout(contains("Camera aspect 1.7778"));
}

#[test]
fn scene_xml_overrides_the_rotation_step() {
    let mut file = NamedTempFile::new().expect("temp scene");
    file.write_all(
        br#"<scene>
  <cube><rotation-step>0.02</rotation-step></cube>
</scene>
"#,
    )
    .expect("write scene");

    let mut cmd = cube_room();
    cmd.arg(file.path())
        .args(["--summary-only", "--frames", "10"]);
    cmd.assert()
        .success()
        .stdout(contains("Final cube rotation=(0.20, 0.20)"));
}

#[test]
fn invalid_scene_xml_is_a_hard_error() {
    let mut file = NamedTempFile::new().expect("temp scene");
    file.write_all(b"<scene><grid><size>0</size></grid></scene>")
        .expect("write scene");

    let mut cmd = cube_room();
    cmd.arg(file.path()).arg("--summary-only");
    cmd.assert().failure();
}
