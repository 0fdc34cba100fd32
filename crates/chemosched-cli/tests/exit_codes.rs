//! Exit-code contract for the `chemosched` binary, grounded on the
//! teacher's own `exit_codes.rs`: spawn the compiled binary and assert on
//! its process exit status rather than calling `main()` in-process.

use std::process::Command;

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_chemosched"))
}

#[test]
fn solve_on_missing_file_exits_failure() {
    let output = bin()
        .args(["solve", "--file", "tests/fixtures/does-not-exist.sm"])
        .output()
        .expect("failed to run binary");

    assert!(!output.status.success());
}

#[test]
fn solve_on_sample_instance_exits_success() {
    let output = bin()
        .args(["solve", "--file", "tests/fixtures/sample.sm"])
        .output()
        .expect("failed to run binary");

    assert!(output.status.success(), "{:?}", output);
}

#[test]
fn solve_rejects_unknown_format() {
    let output = bin()
        .args([
            "solve",
            "--file",
            "tests/fixtures/sample.sm",
            "--format",
            "xml",
        ])
        .output()
        .expect("failed to run binary");

    assert!(!output.status.success());
}

#[test]
fn solve_rejects_malformed_incompatibility_pair() {
    let output = bin()
        .args([
            "solve",
            "--file",
            "tests/fixtures/sample.sm",
            "--incompatible",
            "not-a-pair",
        ])
        .output()
        .expect("failed to run binary");

    assert!(!output.status.success());
}

#[test]
fn generate_requires_capacity_alongside_resource() {
    let output = bin()
        .args([
            "generate",
            "--template",
            "tests/fixtures/sample.sm",
            "--patients",
            "2",
            "--resource",
            "R1",
            "--output",
            "/tmp/chemosched-generate-test-missing-capacity.json",
        ])
        .output()
        .expect("failed to run binary");

    assert!(!output.status.success());
}
