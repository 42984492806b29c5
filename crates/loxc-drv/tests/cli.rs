//! End-to-end tests driving the built `loxc` binary, covering the
//! concrete scenarios an interpreter invocation must satisfy.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn source_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file
}

fn loxc() -> Command {
    Command::cargo_bin("loxc").expect("binary should build")
}

#[test]
fn evaluate_prints_arithmetic_with_precedence() {
    let file = source_file("print 1 + 2 * 3;");
    loxc()
        .arg(file.path())
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("7"));
}

#[test]
fn evaluate_concatenates_strings() {
    let file = source_file(r#"print "foo" + "bar";"#);
    loxc()
        .arg(file.path())
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("foobar"));
}

#[test]
fn block_scope_shadows_and_restores() {
    let file = source_file("var x = 10; { var x = 1; print x; } print x;");
    loxc()
        .arg(file.path())
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("1\n10\n").or(predicate::str::contains("1\r\n10\r\n")));
}

#[test]
fn division_follows_int_vs_float_contract() {
    let file = source_file("print 1 / 2; print 4 / 2;");
    loxc()
        .arg(file.path())
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.5"))
        .stdout(predicate::str::contains("2"));
}

#[test]
fn zero_is_truthy_but_nil_is_not() {
    let file = source_file("print !nil; print !0;");
    loxc()
        .arg(file.path())
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("true"))
        .stdout(predicate::str::contains("false"));
}

#[test]
fn undefined_variable_is_a_runtime_error() {
    let file = source_file("print a;");
    loxc()
        .arg(file.path())
        .arg("run")
        .assert()
        .code(70)
        .stderr(predicate::str::contains("Undefined variable 'a'."));
}

#[test]
fn unterminated_string_is_a_lexical_error() {
    let file = source_file("\"abc");
    loxc()
        .arg(file.path())
        .arg("tokenize")
        .assert()
        .code(65)
        .stderr(predicate::str::contains("[line 1] Error: Unterminated string."));
}

#[test]
fn parse_renders_grouped_and_unary_expression() {
    let file = source_file("(1 + 2) * -3;");
    loxc()
        .arg(file.path())
        .arg("parse")
        .assert()
        .success()
        .stdout(predicate::str::contains("(* (group (+ 1.0 2.0)) (- 3.0))"));
}

#[test]
fn tokenize_emits_eof_marker() {
    let file = source_file("1");
    loxc()
        .arg(file.path())
        .arg("tokenize")
        .assert()
        .success()
        .stdout(predicate::str::contains("EOF"));
}
