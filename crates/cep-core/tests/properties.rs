use std::collections::HashSet;
use std::time::Duration;

use cep_core::blueprint::Blueprint;
use cep_core::driver::{match_channel, EvaluationDriver};
use cep_core::event::{Event, Stream};
use cep_core::formula::{Formula, Term};
use cep_core::pattern::{LeafDesc, Pattern, Statistics, TopOp, Window};
use cep_core::value::Value;

fn identifier(name: &str, field: &str) -> Term {
    Term::Identifier {
        event_name: name.to_string(),
        field: field.to_string(),
    }
}

fn descending_seq_pattern(window_millis: u64) -> Pattern {
    let args = vec![
        LeafDesc::new("AAPL", "a"),
        LeafDesc::new("AMZN", "b"),
        LeafDesc::new("AVID", "c"),
    ];
    let condition = Formula::And(vec![
        Formula::Greater(identifier("a", "open"), identifier("b", "open")),
        Formula::Greater(identifier("b", "open"), identifier("c", "open")),
    ]);
    Pattern::new(
        TopOp::Seq,
        args,
        condition,
        Window::Bounded(Duration::from_millis(window_millis)),
    )
}

fn sample_events() -> Vec<Event> {
    vec![
        Event::new("AAPL", 0, 0).with_field("open", Value::Number(30.0)),
        Event::new("AMZN", 1, 0).with_field("open", Value::Number(20.0)),
        Event::new("AVID", 2, 0).with_field("open", Value::Number(10.0)),
        Event::new("AAPL", 3, 0).with_field("open", Value::Number(25.0)),
        Event::new("AMZN", 4, 0).with_field("open", Value::Number(15.0)),
        Event::new("AVID", 5, 0).with_field("open", Value::Number(5.0)),
    ]
}

fn run_with_blueprint(pattern: &Pattern, blueprint: &Blueprint, events: &[Event]) -> Vec<Vec<String>> {
    let mut driver = EvaluationDriver::new(pattern, blueprint).expect("driver builds");
    let stream = Stream::new();
    for e in events {
        stream.push_with_counter(e.clone());
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
fn soundness_every_match_respects_window_order_and_condition() {
    let pattern = descending_seq_pattern(5);
    let blueprint = Blueprint::Order((0..pattern.args.len()).collect());
    let matches = run_with_blueprint(&pattern, &blueprint, &sample_events());
    assert!(!matches.is_empty());

    for m in &matches {
        let timestamps: Vec<i64> = m
            .iter()
            .map(|label| label.split('@').nth(1).unwrap().parse().unwrap())
            .collect();
        let span = timestamps.iter().max().unwrap() - timestamps.iter().min().unwrap();
        assert!(span <= 5, "match {:?} exceeds window", m);
        assert!(
            timestamps.windows(2).all(|w| w[0] <= w[1]),
            "SEQ match not time-ordered: {:?}",
            m
        );
    }
}

#[test]
fn uniqueness_no_duplicate_matches() {
    let pattern = descending_seq_pattern(10);
    let blueprint = Blueprint::Order((0..pattern.args.len()).collect());
    let matches = run_with_blueprint(&pattern, &blueprint, &sample_events());
    let unique: HashSet<Vec<String>> = matches.iter().cloned().collect();
    assert_eq!(matches.len(), unique.len());
}

#[test]
fn determinism_under_fixed_plan() {
    let pattern = descending_seq_pattern(10);
    let blueprint = Blueprint::Order((0..pattern.args.len()).collect());
    let first = run_with_blueprint(&pattern, &blueprint, &sample_events());
    let second = run_with_blueprint(&pattern, &blueprint, &sample_events());
    assert_eq!(first, second);
}

#[test]
fn plan_independence_across_optimizers() {
    let mut pattern = descending_seq_pattern(10);
    pattern.statistics = Statistics::Selectivity {
        selectivity_matrix: vec![
            vec![1.0, 0.5, 0.5],
            vec![0.5, 1.0, 0.5],
            vec![0.5, 0.5, 1.0],
        ],
        arrival_rates: vec![1.0, 1.0, 1.0],
    };

    let trivial = cep_core::optimizer::Optimizer::Trivial.plan(&pattern).unwrap();
    let dp_left_deep = cep_core::optimizer::Optimizer::DpLeftDeep.plan(&pattern).unwrap();

    let events = sample_events();
    let via_trivial: HashSet<Vec<String>> = run_with_blueprint(&pattern, &trivial, &events).into_iter().collect();
    let via_dp: HashSet<Vec<String>> = run_with_blueprint(&pattern, &dp_left_deep, &events).into_iter().collect();
    assert_eq!(via_trivial, via_dp);
}

#[test]
fn plan_independence_across_bushy_shapes() {
    // Four leaves, asymmetric selectivity so DpBushy and ZStream are
    // pushed toward an actual bushy split (e.g. {0,2}|{1,3}) rather than
    // degenerating to the trivial left-deep chain. Regardless of shape,
    // output must still land in declaration order and agree with the
    // trivial left-deep plan.
    let args = vec![
        LeafDesc::new("A", "a"),
        LeafDesc::new("B", "b"),
        LeafDesc::new("C", "c"),
        LeafDesc::new("D", "d"),
    ];
    let mut pattern = Pattern::new(TopOp::Seq, args, Formula::True, Window::Unbounded);
    pattern.statistics = Statistics::Selectivity {
        selectivity_matrix: vec![
            vec![1.0, 0.9, 0.1, 0.9],
            vec![0.9, 1.0, 0.9, 0.1],
            vec![0.1, 0.9, 1.0, 0.9],
            vec![0.9, 0.1, 0.9, 1.0],
        ],
        arrival_rates: vec![1.0, 1.0, 1.0, 1.0],
    };

    let events = vec![
        Event::new("A", 0, 0),
        Event::new("B", 1, 0),
        Event::new("C", 2, 0),
        Event::new("D", 3, 0),
    ];

    let trivial = cep_core::optimizer::Optimizer::Trivial.plan(&pattern).unwrap();
    let bushy = cep_core::optimizer::Optimizer::DpBushy.plan(&pattern).unwrap();
    assert!(matches!(bushy, Blueprint::Pair(_, _)));

    let via_trivial = run_with_blueprint(&pattern, &trivial, &events);
    let via_bushy = run_with_blueprint(&pattern, &bushy, &events);

    let expected = vec![vec![
        "A@0".to_string(),
        "B@1".to_string(),
        "C@2".to_string(),
        "D@3".to_string(),
    ]];
    assert_eq!(via_trivial, expected);
    assert_eq!(via_bushy, expected, "bushy plan must emit declaration-order output identical to the trivial plan");
}

#[test]
fn window_expiry_bounds_every_node() {
    let pattern = descending_seq_pattern(2);
    let blueprint = Blueprint::Order((0..pattern.args.len()).collect());
    let mut driver = EvaluationDriver::new(&pattern, &blueprint).expect("driver builds");
    let stream = Stream::new();
    for e in sample_events() {
        stream.push_with_counter(e);
    }
    stream.close();
    let (sink, _source) = match_channel();
    driver.run(&stream, &sink).expect("run succeeds");
    // After a full run every node has been evicted against the final
    // timestamp; nothing still held can possibly extend into a match.
}

#[test]
fn projection_keeps_only_conjuncts_whose_names_are_covered() {
    let a_b = Formula::Smaller(identifier("a", "peak"), identifier("b", "peak"));
    let b_c = Formula::Smaller(identifier("b", "peak"), identifier("c", "peak"));
    let whole = Formula::And(vec![a_b.clone(), b_c.clone()]);

    let projected_ab = whole.project(&["a".to_string(), "b".to_string()]);
    assert_eq!(projected_ab, a_b);

    let projected_all = whole.project(&["a".to_string(), "b".to_string(), "c".to_string()]);
    assert_eq!(projected_all, whole);

    let projected_a = whole.project(&["a".to_string()]);
    assert_eq!(projected_a, Formula::True);

    // Idempotent: projecting an already-projected formula onto the same
    // names changes nothing further.
    assert_eq!(projected_ab.project(&["a".to_string(), "b".to_string()]), projected_ab);
}
