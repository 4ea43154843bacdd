use std::{
    io::Write,
    path::PathBuf,
    process::{Command, Output, Stdio},
};

use pretty_assertions::assert_eq;

fn script(name: &str) -> PathBuf {
    [env!("CARGO_MANIFEST_DIR"), "tests", "cli", name].iter().collect()
}

fn lox() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_lox"));
    command.env_remove("RUST_LOG");
    command
}

fn run_file(name: &str, flags: &[&str]) -> Output {
    lox().args(flags).arg(script(name)).output().expect("Failed to run lox")
}

fn run_prompt(input: &str) -> Output {
    let mut child = lox()
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to start lox");

    child.stdin.take().unwrap().write_all(input.as_bytes()).unwrap();
    child.wait_with_output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).unwrap()
}

#[test]
fn file_runs_to_completion() {
    let output = run_file("success.lox", &[]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "3\ndone\n");
    assert_eq!(stderr(&output), "");
}

#[test]
fn compile_error_exits_65_without_running() {
    let output = run_file("compile_error.lox", &[]);
    assert_eq!(output.status.code(), Some(65));
    assert_eq!(stdout(&output), "");
    assert_eq!(stderr(&output), "[line 2] Error at ';': Expect ')' after expression.\n");
}

#[test]
fn runtime_error_exits_70_after_earlier_output() {
    let output = run_file("runtime_error.lox", &[]);
    assert_eq!(output.status.code(), Some(70));
    assert_eq!(stdout(&output), "1\n");
    assert_eq!(stderr(&output), "[line 2] Error: Operand must be a number.\n");
}

#[test]
fn unreadable_file_is_reported() {
    let output = run_file("does_not_exist.lox", &[]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output), "");
    assert!(stderr(&output).contains("Could not read"), "{}", stderr(&output));
}

#[test]
fn dumps_tokens_and_ast() {
    let output = run_file("success.lox", &["--ast"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "(print (+ 1 2))\n(print done)\n3\ndone\n");

    let output = run_file("compile_error.lox", &["--tokens"]);
    assert_eq!(output.status.code(), Some(65));
    assert_eq!(
        stdout(&output),
        "PRINT print nil\nNUMBER 1 1\nSEMICOLON ; nil\n\
         PRINT print nil\nLEFT_PAREN ( nil\nNUMBER 2 2\nSEMICOLON ; nil\nEOF  nil\n"
    );
}

#[test]
fn prompt_survives_errors_and_stops_at_blank_line() {
    let output = run_prompt("print 1;\nprint -nil;\nprint (;\nprint 2;\n\nprint 3;\n");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "> 1\n> > > 2\n> ");
    assert_eq!(
        stderr(&output),
        "[line 1] Error: Operand must be a number.\n[line 1] Error at ';': Expect expression.\n"
    );
}

#[test]
fn prompt_stops_at_end_of_input() {
    let output = run_prompt("print 4;");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "> 4\n> ");
}

#[test]
fn stringify_mixed_addition_flag() {
    let output = run_prompt("print 1 + \"a\";\n");
    assert_eq!(stderr(&output), "[line 1] Error: Operands must be two numbers or two strings.\n");

    let mut child = lox()
        .arg("--stringify-mixed-addition")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(b"print 1 + \"a\";\n").unwrap();
    assert_eq!(String::from_utf8(child.wait_with_output().unwrap().stdout).unwrap(), "> 1a\n> ");
}
