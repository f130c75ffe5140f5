use std::time::Duration;

use cep_core::blueprint::Blueprint;
use cep_core::driver::{match_channel, EvaluationDriver};
use cep_core::event::{Event, Stream};
use cep_core::formula::{Formula, Term};
use cep_core::pattern::{LeafDesc, Pattern, TopOp, Window};
use cep_core::value::Value;

fn event(event_type: &str, timestamp: i64, fields: &[(&str, Value)]) -> Event {
    let mut e = Event::new(event_type, timestamp, 0);
    for (name, value) in fields {
        e = e.with_field(*name, value.clone());
    }
    e
}

fn identifier(name: &str, field: &str) -> Term {
    Term::Identifier {
        event_name: name.to_string(),
        field: field.to_string(),
    }
}

fn run(pattern: &Pattern, events: Vec<Event>) -> Vec<Vec<String>> {
    let blueprint = Blueprint::Order((0..pattern.args.len()).collect());
    let mut driver = EvaluationDriver::new(pattern, &blueprint).expect("driver builds");
    let stream = Stream::new();
    for e in events {
        stream.push_with_counter(e);
    }
    stream.close();
    let (sink, source) = match_channel();
    driver.run(&stream, &sink).expect("run succeeds");
    drop(sink);
    source
        .try_iter()
        .map(|m| m.events.iter().map(|e| format!("{}@{}", e.event_type, e.timestamp)).collect())
        .collect()
}

#[test]
fn s1_simple_descending_seq() {
    let args = vec![
        LeafDesc::new("AAPL", "a"),
        LeafDesc::new("AMZN", "b"),
        LeafDesc::new("AVID", "c"),
    ];
    let condition = Formula::And(vec![
        Formula::Greater(identifier("a", "open"), identifier("b", "open")),
        Formula::Greater(identifier("b", "open"), identifier("c", "open")),
    ]);
    let pattern = Pattern::new(TopOp::Seq, args, condition, Window::Bounded(Duration::from_millis(5)));

    let events = vec![
        event("AAPL", 0, &[("open", Value::Number(10.0))]),
        event("AMZN", 1, &[("open", Value::Number(8.0))]),
        event("AVID", 2, &[("open", Value::Number(5.0))]),
        event("AVID", 10, &[("open", Value::Number(5.0))]),
    ];

    let matches = run(&pattern, events);
    assert_eq!(matches, vec![vec!["AAPL@0", "AMZN@1", "AVID@2"]]);
}

#[test]
fn s2_conjunction_and() {
    let args = vec![LeafDesc::new("AMZN", "a"), LeafDesc::new("GOOG", "g")];
    let condition = Formula::And(vec![
        Formula::SmallerEq(identifier("a", "peak"), Term::Atomic(Value::Number(73.0))),
        Formula::SmallerEq(identifier("g", "peak"), Term::Atomic(Value::Number(525.0))),
    ]);
    let pattern = Pattern::new(TopOp::And, args, condition, Window::Bounded(Duration::from_millis(1)));

    let events = vec![
        event("AMZN", 0, &[("peak", Value::Number(73.0))]),
        event("GOOG", 0, &[("peak", Value::Number(520.0))]),
        event("GOOG", 2, &[("peak", Value::Number(520.0))]),
    ];

    let matches = run(&pattern, events);
    assert_eq!(matches, vec![vec!["AMZN@0", "GOOG@0"]]);
}

#[test]
fn s3_ascending_seq_non_contiguous() {
    let args = vec![
        LeafDesc::new("GOOG", "a"),
        LeafDesc::new("GOOG", "b"),
        LeafDesc::new("GOOG", "c"),
    ];
    let condition = Formula::And(vec![
        Formula::Smaller(identifier("a", "peak"), identifier("b", "peak")),
        Formula::Smaller(identifier("b", "peak"), identifier("c", "peak")),
    ]);
    let pattern = Pattern::new(TopOp::Seq, args, condition, Window::Bounded(Duration::from_millis(3)));

    let events = vec![
        event("GOOG", 0, &[("peak", Value::Number(10.0))]),
        event("GOOG", 1, &[("peak", Value::Number(15.0))]),
        event("GOOG", 2, &[("peak", Value::Number(20.0))]),
    ];
    let matches = run(&pattern, events);
    assert_eq!(matches, vec![vec!["GOOG@0", "GOOG@1", "GOOG@2"]]);

    let mut with_three = vec![
        event("GOOG", 0, &[("peak", Value::Number(10.0))]),
        event("GOOG", 1, &[("peak", Value::Number(15.0))]),
        event("GOOG", 2, &[("peak", Value::Number(20.0))]),
        event("GOOG", 3, &[("peak", Value::Number(25.0))]),
    ];
    with_three.sort_by_key(|e| e.timestamp);
    let matches = run(&pattern, with_three);
    assert_eq!(matches.len(), 4);
    assert!(matches.contains(&vec!["GOOG@0".to_string(), "GOOG@1".to_string(), "GOOG@2".to_string()]));
    assert!(matches.contains(&vec!["GOOG@1".to_string(), "GOOG@2".to_string(), "GOOG@3".to_string()]));
    assert!(matches.contains(&vec!["GOOG@0".to_string(), "GOOG@1".to_string(), "GOOG@3".to_string()]));
    assert!(matches.contains(&vec!["GOOG@0".to_string(), "GOOG@2".to_string(), "GOOG@3".to_string()]));
}

#[test]
fn s4_single_leaf_unary_predicate() {
    let args = vec![LeafDesc::new("AAPL", "a")];
    let condition = Formula::Greater(identifier("a", "open"), Term::Atomic(Value::Number(135.0)));
    let pattern = Pattern::new(TopOp::Seq, args, condition, Window::Unbounded);

    let events = vec![
        event("AAPL", 0, &[("open", Value::Number(130.0))]),
        event("AAPL", 1, &[("open", Value::Number(140.0))]),
        event("AAPL", 2, &[("open", Value::Number(150.0))]),
    ];
    let matches = run(&pattern, events);
    assert_eq!(matches, vec![vec!["AAPL@1"], vec!["AAPL@2"]]);
}

#[test]
fn s5_ordering_guard_rejects_reordered() {
    let args = vec![LeafDesc::new("A", "a"), LeafDesc::new("B", "b")];
    let pattern = Pattern::new(TopOp::Seq, args.clone(), Formula::True, Window::Unbounded);

    let events = vec![event("B", 0, &[]), event("A", 1, &[])];
    let matches = run(&pattern, events.clone());
    assert!(matches.is_empty());

    let and_pattern = Pattern::new(TopOp::And, args, Formula::True, Window::Unbounded);
    let matches = run(&and_pattern, events);
    assert_eq!(matches.len(), 1);
}

#[test]
fn s6_window_boundary_inclusive() {
    let args = vec![LeafDesc::new("A", "a"), LeafDesc::new("B", "b")];
    let pattern = Pattern::new(
        TopOp::Seq,
        args.clone(),
        Formula::True,
        Window::Bounded(Duration::from_millis(5)),
    );

    let matches = run(&pattern, vec![event("A", 0, &[]), event("B", 5, &[])]);
    assert_eq!(matches.len(), 1);

    let matches = run(&pattern, vec![event("A", 0, &[]), event("B", 6, &[])]);
    assert!(matches.is_empty());
}
