//! Integration tests for the command-line front end

use std::io::Write;
use std::process::Command;

fn run_command(args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_gridcalc"))
        // Tests must be deterministic and not depend on a user's config.toml.
        .arg("--no-config")
        .args(args)
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

fn input_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_basic_arithmetic() {
    let (stdout, _, code) = run_command(&["-c", "5 + 3"]);
    assert_eq!(stdout.trim(), "8");
    assert_eq!(code, 0);
}

#[test]
fn test_precedence_and_fractions() {
    let (stdout, _, code) = run_command(&["-c", "(1 + 2) * 3 / 4"]);
    assert_eq!(stdout.trim(), "2.25");
    assert_eq!(code, 0);
}

#[test]
fn test_auto_prepend_equals() {
    let (stdout1, _, _) = run_command(&["-c", "10 + 5"]);
    let (stdout2, _, _) = run_command(&["-c", "=10 + 5"]);
    assert_eq!(stdout1, stdout2);
}

#[test]
fn test_division_by_zero() {
    let (stdout, _, code) = run_command(&["-c", "1/0"]);
    assert_eq!(stdout.trim(), "#DIV0!");
    assert_eq!(code, 1);
}

#[test]
fn test_overflow_is_error() {
    let (stdout, _, code) = run_command(&["-c", "1e308 * 10"]);
    assert_eq!(stdout.trim(), "#DIV0!");
    assert_eq!(code, 1);

    let (stdout, _, code) = run_command(&["-c", "1e999"]);
    assert_eq!(stdout.trim(), "#SYNTAX!");
    assert_eq!(code, 1);
}

#[test]
fn test_deep_nesting_is_syntax_error() {
    let formula = format!("{}1{}", "(".repeat(5000), ")".repeat(5000));
    let (stdout, stderr, code) = run_command(&["-c", &formula]);
    assert_eq!(stdout.trim(), "#SYNTAX!");
    assert!(stderr.contains("nested too deeply"));
    assert_eq!(code, 1);
}

#[test]
fn test_syntax_error_exit_code() {
    let (stdout, stderr, code) = run_command(&["-c", "1 +"]);
    assert_eq!(stdout.trim(), "#SYNTAX!");
    assert!(!stderr.is_empty());
    assert_eq!(code, 1);
}

#[test]
fn test_self_reference_is_cycle() {
    let (stdout, _, code) = run_command(&["-c", "A1 + 1"]);
    assert_eq!(stdout.trim(), "#CYCLE!");
    assert_eq!(code, 1);
}

#[test]
fn test_file_prints_markdown_table() {
    let file = input_file("5\t=A1+3\n=A1*B1\t\n");
    let (stdout, _, code) = run_command(&[file.path().to_str().unwrap()]);
    assert_eq!(code, 0);
    assert_eq!(
        stdout,
        "|   | A | B |\n|---|---|---|\n| 1 | 5 | 8 |\n| 2 | 40 |  |\n"
    );
}

#[test]
fn test_rejected_cells_reported() {
    let file = input_file("=B1\t=A1\n");
    let (stdout, stderr, code) = run_command(&[file.path().to_str().unwrap()]);
    assert_eq!(code, 1);
    assert!(stderr.contains("B1"));
    assert!(stdout.contains("| 1 | 0 |"));
}

#[test]
fn test_output_file() {
    let input = input_file("1\t2\n");
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("grid.md");
    let (_, _, code) = run_command(&[
        input.path().to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
    ]);
    assert_eq!(code, 0);
    let written = std::fs::read_to_string(out).unwrap();
    assert!(written.contains("| 1 | 1 | 2 |"));
}

#[test]
fn test_grid_size_flags() {
    let file = input_file("1\t2\t3\n");
    let (stdout, _, code) = run_command(&["--cols", "2", file.path().to_str().unwrap()]);
    assert_eq!(code, 0);
    assert!(stdout.starts_with("|   | A | B |\n"));
}

#[test]
fn test_unknown_option() {
    let (_, stderr, code) = run_command(&["--bogus"]);
    assert!(stderr.contains("Unknown option: --bogus"));
    assert_eq!(code, 1);
}

#[test]
fn test_missing_input() {
    let (_, stderr, code) = run_command(&[]);
    assert!(stderr.contains("no input"));
    assert_eq!(code, 1);
}
