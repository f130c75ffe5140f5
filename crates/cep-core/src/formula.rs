use std::collections::HashMap;

use crate::event::Event;
use crate::value::Value;

/// An arithmetic term evaluated against a binding of names to events.
///
/// Mirrors the closed term hierarchy of the original condition language
/// (atomic constant, identifier lookup into an event field, and the four
/// binary arithmetic operations) as a single enum rather than a trait
/// hierarchy, so `eval` is exhaustive and terms are comparable/cloneable by
/// derive.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Atomic(Value),
    /// `event_name.field` — looks up `field` on the event bound to `event_name`.
    Identifier { event_name: String, field: String },
    Plus(Box<Term>, Box<Term>),
    Minus(Box<Term>, Box<Term>),
    Mul(Box<Term>, Box<Term>),
    Div(Box<Term>, Box<Term>),
}

impl Term {
    pub fn eval(&self, binding: &HashMap<String, &Event>) -> Option<Value> {
        match self {
            Term::Atomic(v) => Some(v.clone()),
            Term::Identifier { event_name, field } => {
                binding.get(event_name.as_str())?.payload.get(field).cloned()
            }
            Term::Plus(a, b) => numeric_op(a, b, binding, |x, y| x + y),
            Term::Minus(a, b) => numeric_op(a, b, binding, |x, y| x - y),
            Term::Mul(a, b) => numeric_op(a, b, binding, |x, y| x * y),
            Term::Div(a, b) => numeric_op(a, b, binding, |x, y| x / y),
        }
    }

    fn free_names(&self, out: &mut Vec<String>) {
        match self {
            Term::Atomic(_) => {}
            Term::Identifier { event_name, .. } => {
                if !out.contains(event_name) {
                    out.push(event_name.clone());
                }
            }
            Term::Plus(a, b) | Term::Minus(a, b) | Term::Mul(a, b) | Term::Div(a, b) => {
                a.free_names(out);
                b.free_names(out);
            }
        }
    }
}

fn numeric_op(
    a: &Term,
    b: &Term,
    binding: &HashMap<String, &Event>,
    op: impl Fn(f64, f64) -> f64,
) -> Option<Value> {
    let a = a.eval(binding)?.as_number()?;
    let b = b.eval(binding)?.as_number()?;
    Some(Value::Number(op(a, b)))
}

/// A boolean predicate over a binding of names to events.
///
/// `True` is the identity element for conjunction and is what `project`
/// returns when a subformula mentions no name outside the requested set and
/// turns out to be unconditionally satisfied there is nothing left to
/// check, and what an empty `And` collapses to.
#[derive(Debug, Clone, PartialEq)]
pub enum Formula {
    True,
    Eq(Term, Term),
    NotEq(Term, Term),
    Greater(Term, Term),
    Smaller(Term, Term),
    GreaterEq(Term, Term),
    SmallerEq(Term, Term),
    And(Vec<Formula>),
}

impl Formula {
    /// Evaluate against a complete binding. Atomic comparisons that cannot
    /// be evaluated (missing field, mismatched types) are treated as false,
    /// matching the source evaluator's permissive condition semantics.
    pub fn eval(&self, binding: &HashMap<String, &Event>) -> bool {
        match self {
            Formula::True => true,
            Formula::Eq(a, b) => cmp(a, b, binding) == Some(std::cmp::Ordering::Equal),
            Formula::NotEq(a, b) => !matches!(cmp(a, b, binding), Some(std::cmp::Ordering::Equal)),
            Formula::Greater(a, b) => cmp(a, b, binding) == Some(std::cmp::Ordering::Greater),
            Formula::Smaller(a, b) => cmp(a, b, binding) == Some(std::cmp::Ordering::Less),
            Formula::GreaterEq(a, b) => matches!(
                cmp(a, b, binding),
                Some(std::cmp::Ordering::Greater) | Some(std::cmp::Ordering::Equal)
            ),
            Formula::SmallerEq(a, b) => matches!(
                cmp(a, b, binding),
                Some(std::cmp::Ordering::Less) | Some(std::cmp::Ordering::Equal)
            ),
            Formula::And(parts) => parts.iter().all(|f| f.eval(binding)),
        }
    }

    /// Names of events this formula depends on.
    pub fn free_names(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_names(&mut out);
        out
    }

    fn collect_names(&self, out: &mut Vec<String>) {
        match self {
            Formula::True => {}
            Formula::Eq(a, b)
            | Formula::NotEq(a, b)
            | Formula::Greater(a, b)
            | Formula::Smaller(a, b)
            | Formula::GreaterEq(a, b)
            | Formula::SmallerEq(a, b) => {
                a.free_names(out);
                b.free_names(out);
            }
            Formula::And(parts) => {
                for f in parts {
                    f.collect_names(out);
                }
            }
        }
    }

    /// Restrict this formula to the conjuncts whose free names are a subset
    /// of `names`, dropping everything else. Idempotent: projecting an
    /// already-projected formula onto the same (or a superset of) names
    /// returns an equal formula, since a conjunct either belongs wholly to
    /// the kept set or is dropped wholly — there is no partial conjunct.
    pub fn project(&self, names: &[String]) -> Formula {
        match self {
            Formula::And(parts) => {
                let kept: Vec<Formula> = parts
                    .iter()
                    .filter(|f| f.free_names().iter().all(|n| names.contains(n)))
                    .cloned()
                    .collect();
                match kept.len() {
                    0 => Formula::True,
                    1 => kept.into_iter().next().unwrap(),
                    _ => Formula::And(kept),
                }
            }
            other => {
                if other.free_names().iter().all(|n| names.contains(n)) {
                    other.clone()
                } else {
                    Formula::True
                }
            }
        }
    }
}

fn cmp(a: &Term, b: &Term, binding: &HashMap<String, &Event>) -> Option<std::cmp::Ordering> {
    let a = a.eval(binding)?;
    let b = b.eval(binding)?;
    a.partial_cmp(&b)
}
