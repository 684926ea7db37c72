use std::fmt::Display;

use float_cmp::approx_eq;
use serde::Deserialize;
use serde::Serialize;

/// A value produced by a resolver for an `IF`, `ELIF`, or expansion
/// directive. Absent values are represented by `None` at the resolver
/// boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
	/// A boolean, mostly useful as an `IF` condition.
	Bool(bool),
	/// An integer, expanded through its decimal representation.
	Int(i64),
	/// A floating point number, expanded through its `Display` form.
	Float(f64),
	/// A single piece of text. Embedded `\n` characters start new output
	/// lines.
	Text(String),
	/// A sequence of lines spliced into the output with the continuation
	/// lines aligned to the directive's column.
	Lines(Vec<String>),
}

impl Value {
	/// Truthiness used by `IF` and `ELIF`. Empty text, empty line lists,
	/// `false` and zero are falsy.
	pub fn is_truthy(&self) -> bool {
		match self {
			Value::Bool(value) => *value,
			Value::Int(value) => *value != 0,
			Value::Float(value) => *value != 0.0,
			Value::Text(text) => !text.is_empty(),
			Value::Lines(lines) => !lines.is_empty(),
		}
	}

	/// Whether expanding this value contributes nothing to the output.
	pub fn is_empty(&self) -> bool {
		match self {
			Value::Text(text) => text.is_empty(),
			Value::Lines(lines) => lines.is_empty(),
			Value::Bool(_) | Value::Int(_) | Value::Float(_) => false,
		}
	}
}

/// Truthiness of an optional resolver result. Absent values are falsy.
pub fn is_truthy(value: Option<&Value>) -> bool {
	value.is_some_and(Value::is_truthy)
}

impl Eq for Value {}
impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Value::Bool(value), Value::Bool(other_value)) => value == other_value,
			(Value::Int(value), Value::Int(other_value)) => value == other_value,
			(Value::Float(value), Value::Float(other_value)) => {
				approx_eq!(f64, *value, *other_value, ulps = 2)
			}
			(Value::Text(value), Value::Text(other_value)) => value == other_value,
			(Value::Lines(value), Value::Lines(other_value)) => value == other_value,
			_ => false,
		}
	}
}

impl Display for Value {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Value::Bool(value) => write!(f, "{value}"),
			Value::Int(value) => write!(f, "{value}"),
			Value::Float(value) => write!(f, "{value}"),
			Value::Text(text) => write!(f, "{text}"),
			Value::Lines(lines) => write!(f, "{}", lines.join("\n")),
		}
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Value::Bool(value)
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Value::Int(value)
	}
}

impl From<i32> for Value {
	fn from(value: i32) -> Self {
		Value::Int(i64::from(value))
	}
}

impl From<usize> for Value {
	fn from(value: usize) -> Self {
		Value::Int(i64::try_from(value).unwrap_or(i64::MAX))
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Value::Float(value)
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Value::Text(value)
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Value::Text(value.to_string())
	}
}

impl From<Vec<String>> for Value {
	fn from(value: Vec<String>) -> Self {
		Value::Lines(value)
	}
}

impl From<Vec<&str>> for Value {
	fn from(value: Vec<&str>) -> Self {
		Value::Lines(value.into_iter().map(ToString::to_string).collect())
	}
}

impl<const N: usize> From<[&str; N]> for Value {
	fn from(value: [&str; N]) -> Self {
		Value::Lines(value.into_iter().map(ToString::to_string).collect())
	}
}

/// Where in the current output line a directive occurs. Passed to every
/// resolver call so values can align their own continuation lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
	/// Leading spaces and tabs of the line being built.
	pub indentation: String,
	/// Character column at which the directive occurs.
	pub column: usize,
}

impl Context {
	pub fn new(indentation: impl Into<String>, column: usize) -> Self {
		Self {
			indentation: indentation.into(),
			column,
		}
	}

	/// Offset this context by a base context: indentations are concatenated
	/// and columns summed.
	#[must_use]
	pub fn offset_by(&self, base: &Context) -> Context {
		Context {
			indentation: format!("{}{}", base.indentation, self.indentation),
			column: base.column + self.column,
		}
	}
}
