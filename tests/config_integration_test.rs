mod common;
use common::*;

fn fixtures(ws: &Workspace) {
    ws.write("ways.csv", "100,1,2\n");
    ws.write("speeds.csv", "100,12.5\n");
}

#[test]
fn test_project_config_defaults_apply() {
    let ws = Workspace::new();
    fixtures(&ws);
    ws.write(".edgespeedrc", "defaults = --high-precision -o from-config.csv\n");

    let (_stdout, stderr, exit_code) = ws.run(&["-m", "ways.csv", "-s", "speeds.csv"]);
    assert_eq!(exit_code, 0, "{}", stderr);
    assert_eq!(ws.records("from-config.csv"), record_set(&["1,2,12.500000"]));
}

#[test]
fn test_cli_overrides_config_defaults() {
    let ws = Workspace::new();
    fixtures(&ws);
    ws.write(".edgespeedrc", "defaults = -o from-config.csv\n");

    let (_stdout, _stderr, exit_code) =
        ws.run(&["-m", "ways.csv", "-s", "speeds.csv", "-o", "from-cli.csv"]);
    assert_eq!(exit_code, 0);
    assert!(ws.path("from-cli.csv").exists());
    assert!(!ws.path("from-config.csv").exists());
}

#[test]
fn test_alias_expansion() {
    let ws = Workspace::new();
    fixtures(&ws);
    ws.write(
        ".edgespeedrc",
        "[aliases]\ninputs = -m ways.csv -s speeds.csv\nnightly = -a inputs -o nightly.csv\n",
    );

    let (_stdout, stderr, exit_code) = ws.run(&["-a", "nightly"]);
    assert_eq!(exit_code, 0, "{}", stderr);
    assert_eq!(ws.records("nightly.csv"), record_set(&["1,2,12"]));
}

#[test]
fn test_unknown_alias_is_usage_error() {
    let ws = Workspace::new();
    fixtures(&ws);

    let (_stdout, stderr, exit_code) =
        ws.run(&["-m", "ways.csv", "-s", "speeds.csv", "-a", "missing"]);
    assert_eq!(exit_code, 2);
    assert!(stderr.contains("Unknown alias: missing"));
}

#[test]
fn test_ignore_config() {
    let ws = Workspace::new();
    fixtures(&ws);
    ws.write(".edgespeedrc", "defaults = -o from-config.csv\n");

    let (_stdout, _stderr, exit_code) =
        ws.run(&["-m", "ways.csv", "-s", "speeds.csv", "--ignore-config"]);
    assert_eq!(exit_code, 0);
    assert!(ws.path("traffic.csv").exists());
    assert!(!ws.path("from-config.csv").exists());
}

#[test]
fn test_custom_config_file() {
    let ws = Workspace::new();
    fixtures(&ws);
    ws.write(".edgespeedrc", "defaults = -o from-project.csv\n");
    ws.write("custom.ini", "defaults = -o from-custom.csv\n");

    let (_stdout, _stderr, exit_code) = ws.run(&[
        "--config-file",
        "custom.ini",
        "-m",
        "ways.csv",
        "-s",
        "speeds.csv",
    ]);
    assert_eq!(exit_code, 0);
    assert!(ws.path("from-custom.csv").exists());
    assert!(!ws.path("from-project.csv").exists());
}

#[test]
fn test_user_config_in_xdg_dir() {
    let ws = Workspace::new();
    fixtures(&ws);
    std::fs::create_dir_all(ws.path(".config/edgespeed")).unwrap();
    ws.write(".config/edgespeed/config.ini", "defaults = -o from-user.csv\n");

    let (_stdout, _stderr, exit_code) = ws.run(&["-m", "ways.csv", "-s", "speeds.csv"]);
    assert_eq!(exit_code, 0);
    assert!(ws.path("from-user.csv").exists());
}

#[test]
fn test_missing_custom_config_file() {
    let ws = Workspace::new();
    fixtures(&ws);

    let (_stdout, stderr, exit_code) = ws.run(&[
        "--config-file",
        "absent.ini",
        "-m",
        "ways.csv",
        "-s",
        "speeds.csv",
    ]);
    assert_eq!(exit_code, 2);
    assert!(stderr.contains("Failed to read config file"));
}

#[test]
fn test_alias_with_equals_sign() {
    let ws = Workspace::new();
    fixtures(&ws);
    ws.write(".edgespeedrc", "[aliases]\ninputs = -m ways.csv -s speeds.csv\n");

    let (_stdout, stderr, exit_code) = ws.run(&["--alias=inputs", "-o", "eq.csv"]);
    assert_eq!(exit_code, 0, "{}", stderr);
    assert_eq!(ws.records("eq.csv"), record_set(&["1,2,12"]));
}

#[test]
fn test_alias_rejected_when_config_ignored() {
    let ws = Workspace::new();
    fixtures(&ws);
    ws.write(".edgespeedrc", "[aliases]\nnightly = -o nightly.csv\n");

    let (_stdout, stderr, exit_code) = ws.run(&[
        "-m",
        "ways.csv",
        "-s",
        "speeds.csv",
        "--ignore-config",
        "-a",
        "nightly",
    ]);
    assert_eq!(exit_code, 2);
    assert!(stderr.contains("alias 'nightly' cannot be expanded with --ignore-config"));
    assert!(!ws.path("traffic.csv").exists());
    assert!(!ws.path("nightly.csv").exists());
}
