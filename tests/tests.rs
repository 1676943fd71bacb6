use assert_cmd::prelude::*;
use lazy_static::lazy_static;
use predicates::str::contains;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Command;

lazy_static! {
    static ref CORRECTED_REGEX: Regex = Regex::new(r"(?m)^([ACGT]+)\t([0-9.]+)$").unwrap();
}

/// Builds the binary graph from the given neighbor list in a scratch
/// directory and returns its path
fn build_graph(dir: &Path, neighbors: &str) -> PathBuf {
    let graph = dir.join("graph.bin");
    Command::cargo_bin("tagmend")
        .unwrap()
        .args(&[
            "build-graph",
            "tests/input/tags.txt",
            neighbors,
            graph.to_str().unwrap(),
        ])
        .assert()
        .success();
    graph
}

#[test]
fn cli_no_args() {
    Command::cargo_bin("tagmend").unwrap().assert().failure();
}

#[test]
fn cli_no_such_file() {
    Command::cargo_bin("tagmend")
        .unwrap()
        .args(&[
            "correct",
            "tests/input/no_such_tags.txt",
            "tests/input/no_such_graph.bin",
            "tests/input/no_such_counts.txt",
        ])
        .assert()
        .failure()
        .stderr(contains("Error"));
}

#[test]
fn cli_correct_identity_graph_returns_observed() {
    let dir = tempfile::tempdir().unwrap();
    let graph = build_graph(dir.path(), "tests/input/neighbors_identity.txt");

    Command::cargo_bin("tagmend")
        .unwrap()
        .args(&[
            "correct",
            "tests/input/tags.txt",
            graph.to_str().unwrap(),
            "tests/input/counts.txt",
        ])
        .assert()
        .success()
        .stdout(contains("AA\t90"))
        .stdout(contains("AC\t60"))
        .stdout(contains("GT\t20"));
}

#[test]
fn cli_correct_recovers_true_counts() {
    let dir = tempfile::tempdir().unwrap();
    let graph = build_graph(dir.path(), "tests/input/neighbors.txt");

    let output = Command::cargo_bin("tagmend")
        .unwrap()
        .args(&[
            "correct",
            "tests/input/tags.txt",
            graph.to_str().unwrap(),
            "tests/input/counts.txt",
        ])
        .unwrap()
        .stdout;
    let output = String::from_utf8(output).unwrap();

    // observed [90, 60, 20] under the 0.1 misread rate comes from true
    // counts [100, 50, 20]
    let mut corrected = Vec::new();
    for captures in CORRECTED_REGEX.captures_iter(&output) {
        corrected.push((
            captures.get(1).unwrap().as_str().to_string(),
            captures.get(2).unwrap().as_str().parse::<f64>().unwrap(),
        ));
    }
    assert_eq!(corrected.len(), 3);
    for (tag, expected) in &[("AA", 100.0), ("AC", 50.0), ("GT", 20.0)] {
        let (_, value) = corrected
            .iter()
            .find(|(seq, _)| seq == tag)
            .expect("tag missing from output");
        assert!((value - expected).abs() < 1e-6);
    }
}

#[test]
fn cli_correct_rejects_unobserved_tags() {
    let dir = tempfile::tempdir().unwrap();
    let graph = build_graph(dir.path(), "tests/input/neighbors_identity.txt");

    // GT is missing from the counts file so its observed count is zero
    Command::cargo_bin("tagmend")
        .unwrap()
        .args(&[
            "correct",
            "tests/input/tags.txt",
            graph.to_str().unwrap(),
            "tests/input/partial_counts.txt",
        ])
        .assert()
        .failure()
        .stderr(contains("CountBelowOne"));
}

#[test]
fn cli_expect_identity_graph() {
    let dir = tempfile::tempdir().unwrap();
    let graph = build_graph(dir.path(), "tests/input/neighbors_identity.txt");

    Command::cargo_bin("tagmend")
        .unwrap()
        .args(&[
            "expect",
            "tests/input/tags.txt",
            graph.to_str().unwrap(),
            "tests/input/counts.txt",
        ])
        .assert()
        .success()
        .stdout(contains("AA\t90\t0"))
        .stdout(contains("AC\t60\t0"))
        .stdout(contains("GT\t20\t0"));
}

#[test]
fn cli_expect_with_misread_mass() {
    let dir = tempfile::tempdir().unwrap();
    let graph = build_graph(dir.path(), "tests/input/neighbors.txt");

    Command::cargo_bin("tagmend")
        .unwrap()
        .args(&[
            "expect",
            "tests/input/tags.txt",
            graph.to_str().unwrap(),
            "tests/input/counts.txt",
        ])
        .assert()
        .success()
        // 90 reads of AA keep 81 on average, 9 leak onto AC
        .stdout(contains("AA\t81\t2.84"))
        .stdout(contains("AC\t69\t2.84"))
        .stdout(contains("GT\t20\t0"));
}

#[test]
fn cli_dump_graph_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let graph = build_graph(dir.path(), "tests/input/neighbors.txt");

    Command::cargo_bin("tagmend")
        .unwrap()
        .args(&[
            "dump-graph",
            "tests/input/tags.txt",
            graph.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(contains("AA\tAC\t0.1\tAA\t0.9"))
        .stdout(contains("GT\tGT\t1"));
}

#[test]
fn cli_build_graph_rejects_bad_probabilities() {
    let dir = tempfile::tempdir().unwrap();
    let neighbors = dir.path().join("neighbors.txt");
    std::fs::write(&neighbors, "AA\tAC\t0.6\n").unwrap();

    Command::cargo_bin("tagmend")
        .unwrap()
        .args(&[
            "build-graph",
            "tests/input/tags.txt",
            neighbors.to_str().unwrap(),
            dir.path().join("graph.bin").to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(contains("InvalidProb"));
}
