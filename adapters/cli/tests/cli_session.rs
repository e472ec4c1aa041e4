use std::{fs, path::PathBuf, process::Command};

use path_defence_world::SessionSnapshot;

fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("path-defence-{}-{name}", std::process::id()))
}

fn run(args: &[&str]) -> String {
    let output = Command::new(env!("CARGO_BIN_EXE_path-defence"))
        .args(args)
        .output()
        .expect("failed to launch path-defence");
    assert!(
        output.status.success(),
        "path-defence failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout is utf-8")
}

#[test]
fn session_writes_snapshot_of_placed_towers() {
    let snapshot_path = scratch_path("snapshot.json");
    let snapshot_arg = snapshot_path.to_string_lossy().into_owned();

    let stdout = run(&[
        "--max-ticks",
        "50",
        "--tower",
        "basic@2,4",
        "--tower",
        "sniper@0,5",
        "--upgrade",
        "2,4",
        "--snapshot",
        &snapshot_arg,
    ]);

    assert!(stdout.starts_with("Welcome to Path Defence."));
    assert!(stdout.contains("still running after 50 ticks"));

    let json = fs::read_to_string(&snapshot_path).expect("snapshot written");
    let _ = fs::remove_file(&snapshot_path);
    let snapshot: SessionSnapshot = serde_json::from_str(&json).expect("snapshot parses");
    assert_eq!(snapshot.tick_index, 50);
    assert_eq!(snapshot.towers.len(), 1, "tower on the corridor is skipped");
    assert_eq!(snapshot.towers[0].level, 2);
    assert_eq!(snapshot.economy.money, 200 - 50 - 75);
}

#[test]
fn session_from_config_file_runs_to_game_over() {
    let config_path = scratch_path("session.toml");
    fs::write(
        &config_path,
        "starting_lives = 1\nfirst_wave_delay = 0.0\nwaves = [[\"fast\"]]\n",
    )
    .expect("config written");
    let config_arg = config_path.to_string_lossy().into_owned();

    let stdout = run(&["--config", &config_arg, "--tick-ms", "100"]);
    let _ = fs::remove_file(&config_path);

    assert!(stdout.contains("game over"));
    assert!(stdout.contains("lives 0"));
}

#[test]
fn random_placement_is_reproducible() {
    let args = [
        "--auto-towers",
        "3",
        "--seed",
        "7",
        "--max-ticks",
        "400",
        "--tick-ms",
        "50",
    ];
    assert_eq!(run(&args), run(&args));
}
