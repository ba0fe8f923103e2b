//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

struct TestPlan {
    args: Vec<String>,
    expected_out: String,
    expected_err: String,
    expected_exit_code: i32,
}

fn run_msgcheck(args: &[String]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_msgcheck"))
        .args(args)
        .env("LC_ALL", "C")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn run_test(plan: TestPlan) {
    let output = run_msgcheck(&plan.args);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, plan.expected_out);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr, plan.expected_err);

    assert_eq!(output.status.code(), Some(plan.expected_exit_code));
}

fn write_po(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn arg(path: &Path) -> String {
    path.display().to_string()
}

const VALID: &str = r#"msgid ""
msgstr ""
"Content-Type: text/plain; charset=UTF-8\n"
"Plural-Forms: nplurals=2; plural=(n != 1);\n"

#, c-format
msgid "%d apple"
msgid_plural "%d apples"
msgstr[0] "%d Apfel"
msgstr[1] "%d Äpfel"
"#;

#[test]
fn test_msgcheck_valid() {
    let dir = TempDir::new().unwrap();
    let path = write_po(dir.path(), "valid.po", VALID);

    run_test(TestPlan {
        args: vec!["-c".to_string(), arg(&path)],
        expected_out: String::new(),
        expected_err: String::new(),
        expected_exit_code: 0,
    });
}

#[test]
fn test_msgcheck_verbose() {
    let dir = TempDir::new().unwrap();
    let path = write_po(dir.path(), "valid.po", VALID);

    run_test(TestPlan {
        args: vec!["--verbose".to_string(), arg(&path)],
        expected_out: format!("{}: 2 messages\n", arg(&path)),
        expected_err: String::new(),
        expected_exit_code: 0,
    });
}

#[test]
fn test_msgcheck_syntax_error() {
    let dir = TempDir::new().unwrap();
    let path = write_po(dir.path(), "broken.po", "msgid \"a\"\nmsgstr \"b\n");

    run_test(TestPlan {
        args: vec![arg(&path)],
        expected_out: String::new(),
        expected_err: format!(
            "msgcheck: {}:2:10: error: end-of-line within string\n",
            arg(&path)
        ),
        expected_exit_code: 1,
    });
}

#[test]
fn test_msgcheck_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.po");

    let output = run_msgcheck(&[arg(&path)]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let prefix = format!(
        "msgcheck: {}: fatal error: cannot open file \"{}\"",
        arg(&path),
        arg(&path)
    );
    assert!(stderr.starts_with(&prefix), "unexpected stderr: {}", stderr);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_msgcheck_check_format() {
    let dir = TempDir::new().unwrap();
    let path = write_po(
        dir.path(),
        "format.po",
        "#, c-format\nmsgid \"%s and %s\"\nmsgstr \"%s\"\n",
    );

    // without -c only the syntax is checked
    run_test(TestPlan {
        args: vec![arg(&path)],
        expected_out: String::new(),
        expected_err: String::new(),
        expected_exit_code: 0,
    });

    run_test(TestPlan {
        args: vec!["--check".to_string(), arg(&path)],
        expected_out: String::new(),
        expected_err: format!(
            "msgcheck: {}:2: error: number of format specifications in 'msgid' and 'msgstr' does not match\n",
            arg(&path)
        ),
        expected_exit_code: 1,
    });
}

#[test]
fn test_msgcheck_continues_after_bad_file() {
    let dir = TempDir::new().unwrap();
    let bad = write_po(dir.path(), "bad.po", "msgstr \"x\"\n");
    let good = write_po(dir.path(), "good.po", VALID);

    run_test(TestPlan {
        args: vec!["-v".to_string(), arg(&bad), arg(&good)],
        expected_out: format!("{}: 2 messages\n", arg(&good)),
        expected_err: format!(
            "msgcheck: {}:1:1: error: 'msgstr' without preceding 'msgid'\n",
            arg(&bad)
        ),
        expected_exit_code: 1,
    });
}

#[test]
fn test_msgcheck_output_file() {
    let dir = TempDir::new().unwrap();
    let input = write_po(
        dir.path(),
        "in.po",
        "#: b.c:2\n#: a.c:1\nmsgid   \"one two three four five\"\nmsgstr  \"eins \"\n\"zwei drei vier fünf\"\n",
    );
    let output = dir.path().join("out.po");

    run_test(TestPlan {
        args: vec![
            "-w".to_string(),
            "20".to_string(),
            "-o".to_string(),
            arg(&output),
            arg(&input),
        ],
        expected_out: String::new(),
        expected_err: String::new(),
        expected_exit_code: 0,
    });

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "#: b.c:2 a.c:1\nmsgid \"\"\n\"one two three \"\n\"four five\"\nmsgstr \"\"\n\"eins zwei drei \"\n\"vier fünf\"\n"
    );

    run_test(TestPlan {
        args: vec!["--no-wrap".to_string(), "-o".to_string(), arg(&output), arg(&input)],
        expected_out: String::new(),
        expected_err: String::new(),
        expected_exit_code: 0,
    });

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "#: b.c:2 a.c:1\nmsgid \"one two three four five\"\nmsgstr \"eins zwei drei vier fünf\"\n"
    );
}

#[test]
fn test_msgcheck_output_requires_one_input() {
    let dir = TempDir::new().unwrap();
    let a = write_po(dir.path(), "a.po", VALID);
    let b = write_po(dir.path(), "b.po", VALID);

    run_test(TestPlan {
        args: vec![
            "-o".to_string(),
            arg(&dir.path().join("out.po")),
            arg(&a),
            arg(&b),
        ],
        expected_out: String::new(),
        expected_err: "msgcheck: an output file requires exactly one input file\n".to_string(),
        expected_exit_code: 1,
    });
}
