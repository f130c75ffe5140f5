use std::io::{BufRead, Write};

use cep_core::event::Event;
use cep_core::value::Value;
use tracing::debug;

use crate::error::{IoError, IoResult};

/// Describes how to read one comma-separated line into an [`Event`]:
/// `keys[i]` names the field found at position `i`, `event_type_key`
/// selects which of those fields becomes the event's type tag, and
/// `event_time_key` selects which becomes its timestamp (parsed as
/// `YYYYMMDDHHMM`, the original protocol's digit-packed timestamp).
pub struct CsvSchema {
    pub keys: Vec<String>,
    pub event_type_key: String,
    pub event_time_key: String,
}

impl CsvSchema {
    fn type_index(&self) -> Option<usize> {
        self.keys.iter().position(|k| k == &self.event_type_key)
    }

    fn time_index(&self) -> Option<usize> {
        self.keys.iter().position(|k| k == &self.event_time_key)
    }
}

/// Parse every line of `reader` into an [`Event`], in line order, assigning
/// each a counter equal to its 0-based line index.
pub fn read_events(schema: &CsvSchema, reader: impl BufRead) -> IoResult<Vec<Event>> {
    let type_idx = schema
        .type_index()
        .ok_or_else(|| IoError::MissingKey { line: 0, key: schema.event_type_key.clone() })?;
    let time_idx = schema
        .time_index()
        .ok_or_else(|| IoError::MissingKey { line: 0, key: schema.event_time_key.clone() })?;

    let mut events = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != schema.keys.len() {
            return Err(IoError::FieldCountMismatch {
                line: line_no,
                expected: schema.keys.len(),
                found: fields.len(),
            });
        }

        let event_type = fields[type_idx].trim().to_string();
        let timestamp = parse_packed_timestamp(fields[time_idx].trim())
            .ok_or_else(|| IoError::MalformedTimestamp { line: line_no, value: fields[time_idx].to_string() })?;

        let mut event = Event::new(event_type, timestamp, line_no as u64);
        for (key, raw) in schema.keys.iter().zip(fields.iter()) {
            if key == &schema.event_type_key || key == &schema.event_time_key {
                continue;
            }
            event = event.with_field(key.clone(), coerce(raw.trim()));
        }
        events.push(event);
    }
    Ok(events)
}

/// Coerce a raw field to a number when it parses cleanly as one,
/// otherwise keep it as a string — the original protocol's "int if
/// integral, else float, else string" rule.
fn coerce(raw: &str) -> Value {
    if let Ok(n) = raw.parse::<i64>() {
        return Value::Number(n as f64);
    }
    if let Ok(n) = raw.parse::<f64>() {
        return Value::Number(n);
    }
    Value::Str(raw.to_string())
}

/// `YYYYMMDDHHMM` packed into a monotonic integer. Not a real Unix epoch —
/// the core only needs events it delivers to compare and subtract
/// consistently with each other, which this preserves as long as all
/// timestamps come from the same schema.
fn parse_packed_timestamp(raw: &str) -> Option<i64> {
    if raw.len() != 12 || !raw.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let year: i64 = raw[0..4].parse().ok()?;
    let month: i64 = raw[4..6].parse().ok()?;
    let day: i64 = raw[6..8].parse().ok()?;
    let hour: i64 = raw[8..10].parse().ok()?;
    let minute: i64 = raw[10..12].parse().ok()?;
    Some((((year * 12 + month) * 31 + day) * 24 + hour) * 60 + minute)
}

/// Write complete matches out in the original match-file protocol: one
/// event per line (its payload rendered as a `key=value` list), a blank
/// line separating one match from the next.
pub fn write_matches(mut writer: impl Write, matches: &[cep_core::driver::PatternMatch]) -> IoResult<()> {
    for m in matches {
        for event in &m.events {
            let mut fields: Vec<String> = event
                .payload
                .iter()
                .map(|(k, v)| format!("{k}={}", render(v)))
                .collect();
            fields.sort();
            writeln!(writer, "{},{},{}", event.event_type, event.timestamp, fields.join(","))?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

fn render(value: &Value) -> String {
    match value {
        Value::Number(n) => n.to_string(),
        Value::Str(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
    }
}

/// Feed parsed events into a live [`cep_core::event::Stream`] in order,
/// then close it. Split from [`read_events`] so a caller can parse once
/// and replay into several pattern streams.
pub fn feed_stream(stream: &cep_core::event::Stream, events: Vec<Event>) {
    let count = events.len();
    for event in events {
        stream.push_with_counter(event);
    }
    stream.close();
    debug!(count, "stream closed after feeding all parsed events");
}
