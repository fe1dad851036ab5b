//! Purpose: Normalize engine-native numeric containers into portable JSON.
//! Exports: `Column`, `ScalarValue`, `column_json`, `floats_json`, `scalar_json`.
//! Role: Leaf conversion layer; every array in a result payload passes through here.
//! Invariants: Payloads contain only JSON primitives (no engine wrapper types).
//! Invariants: Non-finite floats become JSON `null`; JSON has no NaN or infinity.

use serde_json::{Value, json};

/// A named array as handed over by the engine: device ids may be integers or
/// labels depending on the case format, measurements are always floats.
#[derive(Clone, Debug, PartialEq)]
pub enum Column {
    Float(Vec<f64>),
    Int(Vec<i64>),
    Label(Vec<String>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Float(values) => values.len(),
            Column::Int(values) => values.len(),
            Column::Label(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Concatenate another column of the same shape onto this one.
    ///
    /// Mixed-type concatenation falls back to labels, the widest representation.
    pub fn extend(&mut self, other: Column) {
        match (self, other) {
            (Column::Float(dst), Column::Float(src)) => dst.extend(src),
            (Column::Int(dst), Column::Int(src)) => dst.extend(src),
            (Column::Label(dst), Column::Label(src)) => dst.extend(src),
            (dst, src) => {
                let mut labels = dst.to_labels();
                labels.extend(src.to_labels());
                *dst = Column::Label(labels);
            }
        }
    }

    fn to_labels(&self) -> Vec<String> {
        match self {
            Column::Float(values) => values.iter().map(|v| v.to_string()).collect(),
            Column::Int(values) => values.iter().map(|v| v.to_string()).collect(),
            Column::Label(values) => values.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ScalarValue {
    Float(f64),
    Int(i64),
    Bool(bool),
    Text(String),
}

pub fn scalar_json(value: &ScalarValue) -> Value {
    match value {
        ScalarValue::Float(v) => finite_json(*v),
        ScalarValue::Int(v) => json!(v),
        ScalarValue::Bool(v) => json!(v),
        ScalarValue::Text(v) => json!(v),
    }
}

pub fn column_json(column: &Column) -> Value {
    match column {
        Column::Float(values) => floats_json(values),
        Column::Int(values) => json!(values),
        Column::Label(values) => json!(values),
    }
}

pub fn floats_json(values: &[f64]) -> Value {
    Value::Array(values.iter().map(|v| finite_json(*v)).collect())
}

fn finite_json(value: f64) -> Value {
    if value.is_finite() {
        json!(value)
    } else {
        Value::Null
    }
}
