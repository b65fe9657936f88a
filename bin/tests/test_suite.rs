use itertools::Itertools;
use lazy_regex::regex;
use lox::{Lox, Mode};
use test_suite_proc_macro::generate_tests;

use pretty_assertions::assert_eq;

/// The directory a test file lives in selects the mode it runs with.
fn mode_for(relative_path: &str) -> Mode {
    match relative_path.split('/').next() {
        Some("tokenize") => Mode::Tokenize,
        Some("parse") => Mode::Parse,
        Some("evaluate") => Mode::Evaluate,
        other => panic!("No mode for test directory {:?}", other),
    }
}

pub fn lox_expect(relative_path: &str, code: &str) {
    let mut expected_output = vec![];
    let mut expected_errors = vec![];
    let mut expected_runtime_error = None;

    let runtime_error_regex = regex!(r"// runtime error: (.*)");
    let error_regex = regex!(r"// (\[line (\d+)\] )?(Error.*)");
    let output_regex = regex!(r"// expect: (.*)");

    for (i, line) in code.lines().enumerate() {
        if let Some(cap) = runtime_error_regex.captures(line) {
            assert!(
                expected_runtime_error.is_none(),
                "Evaluation stops at the first runtime error, can't expect two."
            );
            expected_runtime_error = Some((cap[1].to_string(), i + 1));
        } else if let Some(cap) = error_regex.captures(line) {
            let line_number = cap.get(2).map_or((i + 1).to_string(), |m| m.as_str().to_string());
            expected_errors.push(format!("[line {}] {}", line_number, &cap[3]));
        } else if let Some(cap) = output_regex.captures(line) {
            expected_output.push(cap[1].to_string());
        }
    }

    if expected_runtime_error.is_some() {
        assert!(
            expected_errors.is_empty(),
            "Can't have a runtime error when there are syntax errors."
        );
    }

    let expected_exit_code = match (&expected_errors[..], &expected_runtime_error) {
        ([_, ..], _) => 65,
        ([], Some(_)) => 70,
        ([], None) => 0,
    };
    if let Some((message, line)) = expected_runtime_error {
        expected_output.push(message);
        expected_output.push(format!("[line {line}]"));
    }

    let mut output = Vec::new();
    let mut errors = Vec::new();
    let diagnostics = Lox::new(mode_for(relative_path))
        .run_source(code, &mut output, &mut errors)
        .unwrap();

    assert_eq!(
        String::from_utf8(output).unwrap().lines().collect_vec(),
        expected_output,
        "Actual output (left) does not match expected output (right)"
    );
    assert_eq!(
        String::from_utf8(errors).unwrap().lines().collect_vec(),
        expected_errors,
        "Actual errors (left) do not match expected errors (right)"
    );
    assert_eq!(diagnostics.exit_code(), expected_exit_code);
}

generate_tests!();
