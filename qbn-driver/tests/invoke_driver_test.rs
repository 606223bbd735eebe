// SPDX-License-Identifier: Apache-2.0

use std::path::Path;
use std::process::{Command, Output};

use pretty_assertions::assert_eq;

fn driver(cwd: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_qbn-driver"));
    command.current_dir(cwd);
    command
}

fn stdout_of(output: &Output) -> String {
    assert!(
        output.status.success(),
        "driver failed; stdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// `1001 -> left`, `0011 -> right` is separable by a single XOR gate.
fn write_left_right(dir: &Path) -> String {
    let path = dir.join("left_right.txt");
    std::fs::write(&path, "# tiny\n1001 left\n0011 right\n").unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn test_version() {
    let dir = tempfile::tempdir().unwrap();
    let output = driver(dir.path()).arg("version").output().unwrap();
    let stdout = stdout_of(&output);
    assert!(stdout.starts_with(env!("CARGO_PKG_VERSION")), "{}", stdout);
}

#[test]
fn test_train_then_classify_score_and_stats() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = write_left_right(dir.path());
    let network = dir.path().join("net.json");
    let trajectory = dir.path().join("trajectory.json");

    let output = driver(dir.path())
        .args(["train", &dataset, "--layers", "4", "--goal", "1.0"])
        .args(["--max_iterations", "2000", "--seed", "3"])
        .arg("--output")
        .arg(&network)
        .arg("--trajectory")
        .arg(&trajectory)
        .output()
        .unwrap();
    let stdout = stdout_of(&output);
    assert!(stdout.contains("Converged"), "{}", stdout);
    assert!(stdout.contains("Overall Accuracy:  1.00"), "{}", stdout);

    let accuracies: Vec<f64> =
        serde_json::from_str(&std::fs::read_to_string(&trajectory).unwrap()).unwrap();
    assert!(!accuracies.is_empty());
    assert_eq!(accuracies.last().copied(), Some(1.0));

    let network = network.to_str().unwrap();
    let output = driver(dir.path())
        .args(["classify", network, "1001"])
        .output()
        .unwrap();
    assert_eq!(stdout_of(&output).trim(), "left");
    let output = driver(dir.path())
        .args(["classify", network, "0011"])
        .output()
        .unwrap();
    assert_eq!(stdout_of(&output).trim(), "right");

    let output = driver(dir.path())
        .args(["score", network, &dataset])
        .output()
        .unwrap();
    let stdout = stdout_of(&output);
    assert!(stdout.contains("Valid?:            true"), "{}", stdout);

    let output = driver(dir.path()).args(["stats", network]).output().unwrap();
    let stats: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(stats["layer_count"], serde_json::json!(1));
    assert_eq!(stats["gate_count"], serde_json::json!(4));
    assert_eq!(stats["trained"], serde_json::json!(true));
}

#[test]
fn test_train_on_generated_samples_with_trials() {
    let dir = tempfile::tempdir().unwrap();
    let network = dir.path().join("net.qbnbin");
    let output = driver(dir.path())
        .args(["train", "sample://left_vs_right:4", "--layers", "4,4"])
        .args(["--trials", "3", "--max_iterations", "200", "--goal", "0.9"])
        .arg("--output")
        .arg(&network)
        .output()
        .unwrap();
    let stdout = stdout_of(&output);
    assert!(stdout.contains("Best trial:"), "{}", stdout);
    assert!(stdout.contains("Test set:"), "{}", stdout);
    assert!(network.exists());
}

#[test]
fn test_cwd_config_is_picked_up() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = write_left_right(dir.path());
    std::fs::write(
        dir.path().join("qbn.toml"),
        "[training]\nmax_iterations = 0\nlayers = [2, 3]\n",
    )
    .unwrap();
    let network = dir.path().join("net.json");
    let output = driver(dir.path())
        .args(["train", &dataset, "--output"])
        .arg(&network)
        .output()
        .unwrap();
    let stdout = stdout_of(&output);
    assert!(stdout.contains("Exhausted after 0 iterations"), "{}", stdout);

    let output = driver(dir.path())
        .args(["stats", network.to_str().unwrap()])
        .output()
        .unwrap();
    let stats: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(stats["gates_per_layer"], serde_json::json!([2, 3]));
    assert_eq!(stats["trained"], serde_json::json!(false));
}

#[test]
fn test_classify_with_untrained_network_fails() {
    let dir = tempfile::tempdir().unwrap();
    let network = dir.path().join("net.json");
    std::fs::write(&network, r#"{"layers": [[6]], "classifier": null}"#).unwrap();
    let output = driver(dir.path())
        .args(["classify", network.to_str().unwrap(), "1001"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("classify"), "{}", stderr);
    assert!(stderr.contains("train it first"), "{}", stderr);
}

#[test]
fn test_classify_miss_prints_no_label() {
    let dir = tempfile::tempdir().unwrap();
    let network = dir.path().join("net.json");
    std::fs::write(
        &network,
        r#"{"layers": [[6]], "classifier": {"1010": "left"}}"#,
    )
    .unwrap();
    let output = driver(dir.path())
        .args(["classify", network.to_str().unwrap(), "0011"])
        .output()
        .unwrap();
    assert_eq!(stdout_of(&output).trim(), "<no label>");
}

#[test]
fn test_missing_config_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let output = driver(dir.path())
        .args(["--config", "absent.toml", "version"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("could not read config file"), "{}", stderr);
}
