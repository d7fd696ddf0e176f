// Duet Gateway - Frame ingest layer
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! JSON rendering of projected readings

use duet::{Projection, Value};
use serde_json::{Map, Number, Value as Json};

fn to_json_value(value: &Value) -> Json {
    match value {
        Value::Int(v) => Json::from(*v),
        // Non-finite floats have no JSON form
        Value::Float(v) => Number::from_f64(*v).map_or(Json::Null, Json::Number),
        Value::Str(s) => Json::String(s.clone()),
    }
}

/// Projection as a JSON object
pub fn to_json(projection: &Projection) -> Json {
    let map: Map<String, Json> = projection
        .iter()
        .map(|(key, value)| (key.to_string(), to_json_value(value)))
        .collect();
    Json::Object(map)
}

/// Projection as a single JSON line, no trailing newline
pub fn to_json_line(projection: &Projection) -> String {
    to_json(projection).to_string()
}
