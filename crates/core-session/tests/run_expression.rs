mod common;

use common::{output, submit};
use core_session::Session;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

#[test]
fn context_bindings_are_visible_to_the_evaluator() {
    let mut s = Session::new(Vec::new());
    s.context_mut().set("bar", json!(1)).unwrap();
    s.context_mut().set("bar", json!(2)).unwrap();
    let result = s.run_expression("bar").unwrap();
    assert_eq!(Some(&result), s.context().get("bar"));
    assert_eq!(result, json!(2));

    s.context_mut().set("buffer", json!([0, 0, 0, 0])).unwrap();
    assert_eq!(s.run_expression("buffer").unwrap().as_array().unwrap().len(), 4);
}

#[test]
fn basic_run() {
    let mut s = Session::new(Vec::new());
    assert_eq!(s.run_expression("1 + 1").unwrap(), json!(2));
    assert_eq!(s.run_expression("a = 'a'").unwrap(), json!("a"));
    assert_eq!(s.run_expression("a").unwrap(), json!("a"));
}

#[test]
fn underscore_tracks_last_result() {
    let mut s = Session::new(Vec::new());
    assert_eq!(s.run_expression("_").unwrap(), Value::Null);
    s.run_expression("1 + 1").unwrap();
    assert_eq!(s.run_expression("_").unwrap(), json!(2));
    s.run_expression("[1, 2, 3]").unwrap();
    assert_eq!(s.run_expression("_").unwrap().as_array().unwrap().len(), 3);
}

#[test]
fn run_expression_leaves_terminal_and_history_alone() {
    let mut s = Session::new(Vec::new());
    s.run_expression("5").unwrap();
    assert!(s.output().is_empty());
    assert!(s.history().is_empty());
}

#[test]
fn failed_evaluation_keeps_previous_last_result() {
    let mut s = Session::new(Vec::new());
    s.run_expression("3").unwrap();
    assert!(s.run_expression("1 / 0").is_err());
    assert_eq!(s.context().last_result(), &json!(3));
}

#[test]
fn strings_print_verbatim_and_values_are_inspected() {
    let mut s = Session::new(Vec::new());
    submit(&mut s, "'hi' + ' there'");
    submit(&mut s, "[1, 'x']");
    let out = output(&s);
    assert!(out.contains("\r\nhi there\r\n"));
    assert!(out.contains("\r\n[1, \"x\"]\r\n"));
}
