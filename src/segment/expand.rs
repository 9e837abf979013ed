//! Multi-value tool expansion.
//!
//! A search call may fan out over several topics, engines, or queries in one
//! invocation. Each value becomes its own display unit carrying a singleton
//! slice of the arguments and the matching slice of the result.

use message_parts::ToolCall;
use serde::Serialize;
use serde_json::{Map, Value};

use super::tool_kind::{unwrap_output, ToolKind};

/// Argument dimensions in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpansionAxis {
    Topic,
    Engine,
    Query,
}

impl ExpansionAxis {
    pub const PRECEDENCE: [Self; 3] = [Self::Topic, Self::Engine, Self::Query];

    pub fn array_field(&self) -> &'static str {
        match self {
            Self::Topic => "topics",
            Self::Engine => "engines",
            Self::Query => "queries",
        }
    }

    pub fn scalar_field(&self) -> &'static str {
        match self {
            Self::Topic => "topic",
            Self::Engine => "engine",
            Self::Query => "query",
        }
    }
}

/// Per-value argument arrays that travel with the expanded dimension.
const PARALLEL_FIELDS: [&str; 6] = [
    "topics",
    "engines",
    "queries",
    "maxResults",
    "locations",
    "gls",
];

/// How a unit's result was picked out of the shared result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultMatch {
    /// No result yet.
    Pending,
    /// Entry whose `topic`/`engine`/`query` equals the unit's value.
    Discriminant,
    /// Entry at the unit's index.
    Positional,
    /// Whole result, unsliced.
    Shared,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolUnit {
    pub call: ToolCall,
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis: Option<ExpansionAxis>,
    pub index: usize,
    pub siblings: usize,
    pub result_match: ResultMatch,
}

impl ToolUnit {
    fn single(call: &ToolCall, result: Option<&Value>) -> Self {
        Self {
            call: call.clone(),
            result: result.cloned(),
            axis: None,
            index: 0,
            siblings: 1,
            result_match: if result.is_some() {
                ResultMatch::Shared
            } else {
                ResultMatch::Pending
            },
        }
    }

    pub fn tool_name(&self) -> &str {
        &self.call.tool_name
    }

    pub fn kind(&self) -> ToolKind {
        ToolKind::from_name(&self.call.tool_name)
    }

    pub fn is_pending(&self) -> bool {
        self.result.is_none()
    }
}

/// Splits one tool segment into display units.
///
/// Falls through to a single unit when no dimension is an array of more
/// than one value.
pub fn expand(call: &ToolCall, result: Option<&Value>) -> Vec<ToolUnit> {
    for axis in ExpansionAxis::PRECEDENCE {
        match call.args.get(axis.array_field()) {
            Some(Value::Array(values)) if values.len() > 1 => {
                return expand_along(axis, values, call, result);
            }
            Some(Value::Array(_)) | None => {}
            Some(other) => {
                tracing::debug!(
                    tool_call_id = %call.tool_call_id,
                    field = axis.array_field(),
                    found = ?other,
                    "ignoring non-array expansion field"
                );
            }
        }
    }
    vec![ToolUnit::single(call, result)]
}

fn expand_along(
    axis: ExpansionAxis,
    values: &[Value],
    call: &ToolCall,
    result: Option<&Value>,
) -> Vec<ToolUnit> {
    let siblings = values.len();
    let Some(args) = call.args.as_object() else {
        return vec![ToolUnit::single(call, result)];
    };

    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let (result, result_match) = match result {
                None => (None, ResultMatch::Pending),
                Some(result) => {
                    let occurrence = values[..index].iter().filter(|v| *v == value).count();
                    let (slice, result_match) =
                        slice_result(result, axis, value, occurrence, index);
                    (Some(slice), result_match)
                }
            };
            ToolUnit {
                call: ToolCall {
                    tool_call_id: call.tool_call_id.clone(),
                    tool_name: call.tool_name.clone(),
                    args: Value::Object(slice_args(args, siblings, index)),
                },
                result,
                axis: Some(axis),
                index,
                siblings,
                result_match,
            }
        })
        .collect()
}

/// Slices every parallel array of length `siblings` and sets the matching scalars.
fn slice_args(args: &Map<String, Value>, siblings: usize, index: usize) -> Map<String, Value> {
    let mut sliced = args.clone();
    for field in PARALLEL_FIELDS {
        let Some(Value::Array(items)) = args.get(field) else {
            continue;
        };
        if items.len() != siblings {
            continue;
        }
        let item = items[index].clone();
        if let Some(scalar) = ExpansionAxis::PRECEDENCE
            .iter()
            .find(|candidate| candidate.array_field() == field)
            .map(ExpansionAxis::scalar_field)
        {
            sliced.insert(scalar.to_string(), item.clone());
        }
        sliced.insert(field.to_string(), Value::Array(vec![item]));
    }
    sliced
}

/// Picks the unit's slice: discriminant match, then position, then the whole result.
fn slice_result(
    result: &Value,
    axis: ExpansionAxis,
    value: &Value,
    occurrence: usize,
    index: usize,
) -> (Value, ResultMatch) {
    let unwrapped = unwrap_output(result);
    let Some((key, entries)) = ["searches", "results"].iter().find_map(|key| {
        unwrapped
            .get(*key)
            .and_then(Value::as_array)
            .map(|entries| (*key, entries))
    }) else {
        return (result.clone(), ResultMatch::Shared);
    };

    let discriminant = entries
        .iter()
        .filter(|entry| entry.get(axis.scalar_field()) == Some(value))
        .nth(occurrence);
    let (entry, result_match) = match discriminant {
        Some(entry) => (entry, ResultMatch::Discriminant),
        None => match entries.get(index) {
            Some(entry) => (entry, ResultMatch::Positional),
            None => return (result.clone(), ResultMatch::Shared),
        },
    };

    let mut sliced = unwrapped.clone();
    if let Some(object) = sliced.as_object_mut() {
        object.insert(key.to_string(), Value::Array(vec![entry.clone()]));
    }
    (sliced, result_match)
}
