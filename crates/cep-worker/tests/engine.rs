use cep_core::formula::Formula;
use cep_core::pattern::{LeafDesc, Pattern, TopOp, Window};
use cep_core::value::Value;
use cep_core::Event;
use cep_worker::CepEngine;

#[test]
fn single_pattern_round_trip() {
    let mut engine = CepEngine::new();
    let args = vec![LeafDesc::new("A", "a"), LeafDesc::new("B", "b")];
    let pattern = Pattern::new(TopOp::Seq, args, Formula::True, Window::Unbounded);

    let matches = engine.submit("ab-seq", pattern, None).expect("submit succeeds");

    engine.push_event(Event::new("A", 0, 0).with_field("x", Value::Number(1.0)));
    engine.push_event(Event::new("B", 1, 0).with_field("x", Value::Number(2.0)));
    engine.close().expect("engine closes cleanly");

    let collected: Vec<_> = matches.try_iter().collect();
    assert_eq!(collected.len(), 1);
    assert_eq!(collected[0].events.len(), 2);
}
