use anyhow::{bail, Context, Result};
use cep_core::formula::{Formula, Term};
use cep_core::value::Value;

/// A tiny fixed-grammar reader for condition expressions passed on the
/// command line, e.g. `a.open>b.open` or `a.peak<=73`. Not a general
/// expression language — no parentheses, no arithmetic, one comparison
/// per `--cond` flag — just enough to drive [`cep_core::formula::Formula`]
/// from a shell invocation. Multiple `--cond` flags are conjoined.
pub fn parse_conditions(exprs: &[String]) -> Result<Formula> {
    let parts: Vec<Formula> = exprs.iter().map(|e| parse_one(e)).collect::<Result<_>>()?;
    Ok(match parts.len() {
        0 => Formula::True,
        1 => parts.into_iter().next().unwrap(),
        _ => Formula::And(parts),
    })
}

const OPERATORS: &[&str] = &[">=", "<=", "==", "!=", ">", "<"];

fn parse_one(expr: &str) -> Result<Formula> {
    let expr = expr.trim();
    let (op, pos) = OPERATORS
        .iter()
        .filter_map(|op| expr.find(op).map(|pos| (*op, pos)))
        .min_by_key(|(_, pos)| *pos)
        .with_context(|| format!("condition {expr:?} has no recognized comparison operator"))?;

    let (lhs, rhs) = expr.split_at(pos);
    let rhs = &rhs[op.len()..];
    let lhs_term = parse_term(lhs.trim())?;
    let rhs_term = parse_term(rhs.trim())?;

    Ok(match op {
        ">=" => Formula::GreaterEq(lhs_term, rhs_term),
        "<=" => Formula::SmallerEq(lhs_term, rhs_term),
        "==" => Formula::Eq(lhs_term, rhs_term),
        "!=" => Formula::NotEq(lhs_term, rhs_term),
        ">" => Formula::Greater(lhs_term, rhs_term),
        "<" => Formula::Smaller(lhs_term, rhs_term),
        other => bail!("unreachable operator {other}"),
    })
}

fn parse_term(raw: &str) -> Result<Term> {
    if let Some((event_name, field)) = raw.split_once('.') {
        return Ok(Term::Identifier {
            event_name: event_name.to_string(),
            field: field.to_string(),
        });
    }
    if let Ok(n) = raw.parse::<f64>() {
        return Ok(Term::Atomic(Value::Number(n)));
    }
    if raw == "true" || raw == "false" {
        return Ok(Term::Atomic(Value::Bool(raw == "true")));
    }
    Ok(Term::Atomic(Value::Str(raw.trim_matches('"').to_string())))
}
