//! CLI tests for the `hmm` binary: payloads, config handling, exit codes.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn hmm() -> Command {
    let mut cmd = Command::cargo_bin("hmm").expect("hmm binary should exist");
    for var in [
        "HMM_CONFIG",
        "HMM_LOG",
        "HMM_LOG_FORMAT",
        "HMM_MAX_ITERATIONS",
        "HMM_TOLERANCE",
        "HMM_ZERO_OCCUPANCY",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn stdout_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().expect("command should run");
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

mod simulate {
    use super::*;

    #[test]
    fn emits_states_and_observations() {
        let json = stdout_json(hmm().args(["simulate", "--length", "25", "--seed", "3"]));
        assert_eq!(json["states"].as_array().unwrap().len(), 25);
        assert_eq!(json["observations"].as_array().unwrap().len(), 25);
    }

    #[test]
    fn same_seed_same_output() {
        let a = hmm()
            .args(["simulate", "--length", "30", "--seed", "9"])
            .output()
            .unwrap();
        let b = hmm()
            .args(["simulate", "--length", "30", "--seed", "9"])
            .output()
            .unwrap();
        assert_eq!(a.stdout, b.stdout);
    }

    #[test]
    fn pinned_initial_state() {
        let json = stdout_json(hmm().args([
            "simulate",
            "--length",
            "5",
            "--initial-state",
            "1",
        ]));
        assert_eq!(json["states"][0], 1);
    }

    #[test]
    fn out_of_range_initial_state_fails() {
        hmm()
            .args(["simulate", "--initial-state", "4", "--log-level", "off"])
            .assert()
            .code(11)
            .stdout(predicate::str::contains("ERR_INPUT"));
    }
}

mod scenario {
    use super::*;

    #[test]
    fn reports_accuracy_and_convergence() {
        let json = stdout_json(hmm().args([
            "scenario",
            "--length",
            "250",
            "--seed",
            "42",
            "--tolerance",
            "1e-4",
        ]));
        assert!(json["decode_accuracy"].as_f64().unwrap() > 0.95);
        assert_eq!(json["status"], "converged");
        assert_eq!(json["fitted"]["means"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn config_file_limits_iterations() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[fit]\nmax_iterations = 2\ntolerance = 0.0").unwrap();
        let json = stdout_json(hmm().args(["scenario", "--length", "50", "--config"]).arg(file.path()));
        assert_eq!(json["iterations"], 2);
        assert_eq!(json["status"], "max_iterations");
    }

    #[test]
    fn cli_flag_overrides_environment() {
        let json = stdout_json(
            hmm()
                .env("HMM_MAX_ITERATIONS", "1")
                .args(["scenario", "--length", "50", "--max-iterations", "3", "--tolerance", "0"]),
        );
        assert_eq!(json["iterations"], 3);
    }

    #[test]
    fn malformed_config_exits_with_config_code() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[fit\nmax_iterations = ").unwrap();
        hmm()
            .args(["scenario", "--log-level", "off", "--config"])
            .arg(file.path())
            .assert()
            .code(10)
            .stdout(predicate::str::contains("ERR_CONFIG"));
    }

    #[test]
    fn invalid_environment_value_exits_with_config_code() {
        hmm()
            .env("HMM_TOLERANCE", "small")
            .args(["scenario", "--log-level", "off"])
            .assert()
            .code(10);
    }

    #[test]
    fn negative_tolerance_is_rejected() {
        hmm()
            .args(["scenario", "--tolerance=-1", "--log-level", "off"])
            .assert()
            .code(10);
    }
}

mod usage {
    use super::*;

    #[test]
    fn unknown_command_fails() {
        hmm()
            .arg("nonexistent-command")
            .assert()
            .code(2)
            .stderr(predicate::str::contains("error"));
    }

    #[test]
    fn help_lists_subcommands() {
        hmm()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("simulate"))
            .stdout(predicate::str::contains("scenario"));
    }

    #[test]
    fn jsonl_logs_go_to_stderr() {
        let output = hmm()
            .args(["scenario", "--length", "30", "--log-format", "jsonl", "--log-level", "info"])
            .output()
            .unwrap();
        assert!(output.status.success());
        let stderr = String::from_utf8(output.stderr).unwrap();
        let first = stderr.lines().next().expect("at least one log line");
        let event: serde_json::Value = serde_json::from_str(first).unwrap();
        assert!(event.get("level").is_some());
        serde_json::from_slice::<serde_json::Value>(&output.stdout).unwrap();
    }
}
