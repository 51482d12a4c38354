//! Candidate filter validation
//!
//! Turns an untrusted JSON object (typed in by a user or produced by a text
//! generation model) into a [`FilterSpec`]. The accepted grammar is the
//! MongoDB-style subset models already emit:
//!
//! ```json
//! {
//!   "filter": {
//!     "year": { "$gte": 2020 },
//!     "keywords": { "$in": ["deep learning"] },
//!     "$or": [{ "isFavorite": true }, { "rating": { "$gte": 4 } }]
//!   },
//!   "sort": { "year": -1 }
//! }
//! ```
//!
//! Field names, operators and literal types are all checked against closed
//! sets; the first violation rejects the whole candidate. Unknown top-level
//! keys are dropped. The filter tree is bounded in depth, node count and set
//! size by [`Limits`].

use super::error::FilterError;
use super::types::{
    Bound, CompareOp, Field, FieldKind, FilterSpec, Predicate, Scalar, SetOp, SortDirection,
    SortKey, TextPattern,
};
use crate::document::ReadStatus;
use chrono::{DateTime, Local, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Names that identify the record owner in the document store
const OWNERSHIP_FIELDS: &[&str] = &[
    "owner", "ownerId", "owner_id", "user", "userId", "user_id", "_id", "id",
];

/// Bounds applied to every candidate filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum nesting of `$and` / `$or`
    pub max_depth: usize,
    /// Maximum number of conditions in the whole tree
    pub max_nodes: usize,
    /// Maximum number of values in `$in` / `$nin` / `$all`
    pub max_set_values: usize,
    /// Maximum number of sort keys
    pub max_sort_keys: usize,
    /// Maximum length (in characters) of a text literal or pattern
    pub max_text_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: 8,
            max_nodes: 64,
            max_set_values: 50,
            max_sort_keys: 4,
            max_text_len: 256,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Eq,
    Ne,
    Order,
    In,
    NotIn,
    All,
    Regex,
}

const fn applicable(kind: FieldKind, op: Op) -> bool {
    match op {
        Op::Eq | Op::Ne => !matches!(kind, FieldKind::Timestamp),
        Op::Order => matches!(
            kind,
            FieldKind::Integer | FieldKind::Number | FieldKind::Timestamp
        ),
        Op::In | Op::NotIn => matches!(
            kind,
            FieldKind::Text
                | FieldKind::TextList
                | FieldKind::Integer
                | FieldKind::Number
                | FieldKind::Status
        ),
        Op::All => matches!(kind, FieldKind::TextList),
        Op::Regex => matches!(kind, FieldKind::Text | FieldKind::TextList),
    }
}

const fn kind_label(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Text | FieldKind::TextList => "a string",
        FieldKind::Integer => "a whole number",
        FieldKind::Number => "a number",
        FieldKind::Status => "one of unread, read, important",
        FieldKind::Boolean => "true or false",
        FieldKind::Timestamp => "a date string",
    }
}

/// Detects the JSON type as a string for error messages
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::String(_) => "string",
        Value::Number(_) => "number",
        Value::Bool(_) => "boolean",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
        Value::Null => "null",
    }
}

/// Parse an RFC 3339 timestamp or a plain `YYYY-MM-DD` date (local midnight)
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)?
        .and_local_timezone(Local)
        .single()
        .map(|ts| ts.with_timezone(&Utc))
}

fn resolve_field(name: &str) -> Result<Field, FilterError> {
    if let Some(field) = Field::from_name(name) {
        return Ok(field);
    }
    if OWNERSHIP_FIELDS.contains(&name) {
        tracing::warn!(field = name, "rejected filter condition on an ownership field");
    }
    Err(FilterError::InvalidField(name.to_string()))
}

struct Parser<'a> {
    limits: &'a Limits,
    nodes: usize,
}

impl<'a> Parser<'a> {
    const fn new(limits: &'a Limits) -> Self {
        Self { limits, nodes: 0 }
    }

    fn node(&mut self) -> Result<(), FilterError> {
        self.nodes += 1;
        if self.nodes > self.limits.max_nodes {
            return Err(FilterError::TooComplex(format!(
                "more than {} conditions",
                self.limits.max_nodes
            )));
        }
        Ok(())
    }

    fn filter_object(
        &mut self,
        map: &Map<String, Value>,
        depth: usize,
    ) -> Result<Predicate, FilterError> {
        if depth > self.limits.max_depth {
            return Err(FilterError::TooComplex(format!(
                "nested deeper than {} levels",
                self.limits.max_depth
            )));
        }

        let mut clauses = Vec::with_capacity(map.len());
        for (key, value) in map {
            match key.as_str() {
                "$and" => {
                    self.node()?;
                    clauses.push(Predicate::All(self.logical(key, value, depth)?));
                }
                "$or" => {
                    self.node()?;
                    clauses.push(Predicate::Any(self.logical(key, value, depth)?));
                }
                op if op.starts_with('$') => {
                    return Err(FilterError::InvalidOperator(op.to_string()));
                }
                name => {
                    let field = resolve_field(name)?;
                    clauses.extend(self.field_condition(field, value)?);
                }
            }
        }
        Ok(Predicate::all_of(clauses))
    }

    fn logical(
        &mut self,
        key: &str,
        value: &Value,
        depth: usize,
    ) -> Result<Vec<Predicate>, FilterError> {
        let Value::Array(items) = value else {
            return Err(FilterError::value(key, "expected an array of conditions"));
        };
        if items.is_empty() {
            return Err(FilterError::value(key, "needs at least one condition"));
        }
        items
            .iter()
            .map(|item| match item {
                Value::Object(map) => self.filter_object(map, depth + 1),
                other => Err(FilterError::value(
                    key,
                    format!("each condition must be an object, got {}", json_type_name(other)),
                )),
            })
            .collect()
    }

    fn require(&self, field: Field, op: Op, operator: &str) -> Result<(), FilterError> {
        if applicable(field.kind(), op) {
            Ok(())
        } else {
            Err(FilterError::UnsupportedOperator {
                field: field.name().to_string(),
                operator: operator.to_string(),
            })
        }
    }

    fn field_condition(&mut self, field: Field, value: &Value) -> Result<Vec<Predicate>, FilterError> {
        match value {
            Value::Object(ops) if ops.keys().any(|k| k.starts_with('$')) => self.operators(field, ops),
            Value::Object(_) => Err(FilterError::value(
                field.name(),
                "embedded documents are not supported; use operators such as $gte or $in",
            )),
            Value::Array(items) if field.kind() == FieldKind::TextList => {
                self.require(field, Op::All, "$all")?;
                self.node()?;
                Ok(vec![Predicate::Membership {
                    field,
                    op: SetOp::All,
                    values: self.set(field, items)?,
                }])
            }
            Value::Array(_) => Err(FilterError::value(
                field.name(),
                "a list is only accepted for list fields; use $in",
            )),
            literal => {
                self.node()?;
                Ok(vec![self.equality(field, literal, CompareOp::Eq)?])
            }
        }
    }

    fn equality(&self, field: Field, operand: &Value, op: CompareOp) -> Result<Predicate, FilterError> {
        let (check, name) = match op {
            CompareOp::Eq => (Op::Eq, "$eq"),
            CompareOp::Ne => (Op::Ne, "$ne"),
        };
        self.require(field, check, name)?;

        if operand.is_null() {
            return Ok(Predicate::Exists {
                field,
                present: op == CompareOp::Ne,
            });
        }
        Ok(Predicate::Compare {
            field,
            op,
            value: self.scalar(field, operand)?,
        })
    }

    fn operators(&mut self, field: Field, ops: &Map<String, Value>) -> Result<Vec<Predicate>, FilterError> {
        let options = match ops.get("$options") {
            None => None,
            Some(Value::String(o)) => Some(o.as_str()),
            Some(_) => return Err(FilterError::value(field.name(), "$options must be a string")),
        };

        let mut clauses = Vec::new();
        let mut lower: Option<Bound> = None;
        let mut upper: Option<Bound> = None;

        for (op, operand) in ops {
            match op.as_str() {
                "$eq" => {
                    self.node()?;
                    clauses.push(self.equality(field, operand, CompareOp::Eq)?);
                }
                "$ne" => {
                    self.node()?;
                    clauses.push(self.equality(field, operand, CompareOp::Ne)?);
                }
                "$gt" | "$gte" => {
                    self.require(field, Op::Order, op)?;
                    if lower.is_some() {
                        return Err(FilterError::value(field.name(), "more than one lower bound"));
                    }
                    lower = Some(Bound {
                        value: self.scalar(field, operand)?,
                        inclusive: op == "$gte",
                    });
                }
                "$lt" | "$lte" => {
                    self.require(field, Op::Order, op)?;
                    if upper.is_some() {
                        return Err(FilterError::value(field.name(), "more than one upper bound"));
                    }
                    upper = Some(Bound {
                        value: self.scalar(field, operand)?,
                        inclusive: op == "$lte",
                    });
                }
                "$in" | "$nin" | "$all" => {
                    let (check, set_op) = match op.as_str() {
                        "$in" => (Op::In, SetOp::In),
                        "$nin" => (Op::NotIn, SetOp::NotIn),
                        _ => (Op::All, SetOp::All),
                    };
                    self.require(field, check, op)?;
                    self.node()?;
                    let Value::Array(items) = operand else {
                        return Err(FilterError::value(
                            field.name(),
                            format!("{op} expects an array, got {}", json_type_name(operand)),
                        ));
                    };
                    clauses.push(Predicate::Membership {
                        field,
                        op: set_op,
                        values: self.set(field, items)?,
                    });
                }
                "$regex" => {
                    self.require(field, Op::Regex, op)?;
                    self.node()?;
                    clauses.push(Predicate::Matches {
                        field,
                        pattern: self.pattern(field, operand, options)?,
                    });
                }
                "$options" => {
                    if !ops.contains_key("$regex") {
                        return Err(FilterError::InvalidOperator("$options without $regex".into()));
                    }
                }
                "$exists" => {
                    self.node()?;
                    let Value::Bool(present) = operand else {
                        return Err(FilterError::value(field.name(), "$exists expects true or false"));
                    };
                    clauses.push(Predicate::Exists {
                        field,
                        present: *present,
                    });
                }
                other => return Err(FilterError::InvalidOperator(other.to_string())),
            }
        }

        if lower.is_some() || upper.is_some() {
            self.node()?;
            clauses.push(Predicate::Range { field, lower, upper });
        }
        Ok(clauses)
    }

    fn set(&self, field: Field, items: &[Value]) -> Result<Vec<Scalar>, FilterError> {
        if items.len() > self.limits.max_set_values {
            return Err(FilterError::TooComplex(format!(
                "more than {} values for `{field}`",
                self.limits.max_set_values
            )));
        }
        items.iter().map(|item| self.scalar(field, item)).collect()
    }

    fn pattern(&self, field: Field, operand: &Value, options: Option<&str>) -> Result<TextPattern, FilterError> {
        let Value::String(source) = operand else {
            return Err(FilterError::value(field.name(), "$regex expects a string"));
        };
        // Matching is always case-insensitive; other flags become inline flags.
        let mut flags = String::new();
        if let Some(options) = options {
            for flag in options.chars() {
                match flag {
                    'i' => {}
                    'm' | 's' | 'x' => {
                        if !flags.contains(flag) {
                            flags.push(flag);
                        }
                    }
                    _ => {
                        return Err(FilterError::InvalidOperator(format!("$options \"{options}\"")));
                    }
                }
            }
        }
        let source = if flags.is_empty() {
            source.clone()
        } else {
            format!("(?{flags}){source}")
        };
        // Counted with the inline flags, the form `to_json` writes back
        if source.chars().count() > self.limits.max_text_len {
            return Err(FilterError::value(field.name(), "pattern too long"));
        }

        TextPattern::new(source)
            .map_err(|e| FilterError::value(field.name(), format!("invalid pattern: {e}")))
    }

    fn scalar(&self, field: Field, operand: &Value) -> Result<Scalar, FilterError> {
        let name = field.name();
        match (field.kind(), operand) {
            (FieldKind::Text | FieldKind::TextList, Value::String(s)) => {
                if s.chars().count() > self.limits.max_text_len {
                    return Err(FilterError::value(name, "text value too long"));
                }
                Ok(Scalar::Text(s.clone()))
            }
            (FieldKind::Integer, Value::Number(n)) => {
                let v = n.as_f64().unwrap_or(f64::NAN);
                if v.fract() != 0.0 {
                    return Err(FilterError::value(name, format!("expected a whole number, got {n}")));
                }
                if !(0.0..=9999.0).contains(&v) {
                    return Err(FilterError::value(name, format!("{n} is out of range")));
                }
                Ok(Scalar::Number(v))
            }
            (FieldKind::Number, Value::Number(n)) => match n.as_f64() {
                Some(v) if v.is_finite() => Ok(Scalar::Number(v)),
                _ => Err(FilterError::value(name, format!("{n} is not a finite number"))),
            },
            (FieldKind::Status, Value::String(s)) => s
                .parse::<ReadStatus>()
                .map(Scalar::Status)
                .map_err(|e| FilterError::value(name, e)),
            (FieldKind::Boolean, Value::Bool(b)) => Ok(Scalar::Bool(*b)),
            (FieldKind::Timestamp, Value::String(s)) => parse_timestamp(s)
                .map(Scalar::Timestamp)
                .ok_or_else(|| {
                    FilterError::value(name, format!("'{s}' is not a date (expected RFC 3339 or YYYY-MM-DD)"))
                }),
            (kind, other) => Err(FilterError::value(
                name,
                format!("expected {}, got {}", kind_label(kind), json_type_name(other)),
            )),
        }
    }
}

fn parse_direction(field: &str, value: &Value) -> Result<SortDirection, FilterError> {
    match value {
        Value::Number(n) if n.as_i64() == Some(1) => Ok(SortDirection::Ascending),
        Value::Number(n) if n.as_i64() == Some(-1) => Ok(SortDirection::Descending),
        Value::String(s) if s == "asc" || s == "ascending" => Ok(SortDirection::Ascending),
        Value::String(s) if s == "desc" || s == "descending" => Ok(SortDirection::Descending),
        other => Err(FilterError::value(
            field,
            format!("sort direction must be 1, -1, \"asc\" or \"desc\", got {other}"),
        )),
    }
}

fn sort_entry(item: &Value) -> Result<(String, &Value), FilterError> {
    match item {
        Value::Object(map) => {
            let field = map
                .get("field")
                .and_then(Value::as_str)
                .ok_or_else(|| FilterError::value("sort", "entry is missing a `field` string"))?;
            let direction = map
                .get("direction")
                .ok_or_else(|| FilterError::value(field, "sort entry is missing `direction`"))?;
            Ok((field.to_string(), direction))
        }
        Value::Array(pair) if pair.len() == 2 => {
            let field = pair[0]
                .as_str()
                .ok_or_else(|| FilterError::value("sort", "entry must start with a field name"))?;
            Ok((field.to_string(), &pair[1]))
        }
        other => Err(FilterError::value(
            "sort",
            format!("unsupported sort entry of type {}", json_type_name(other)),
        )),
    }
}

/// Validate a sort clause on its own
///
/// # Errors
///
/// Returns `FilterError` if a field is not sortable, a direction is not one of
/// the accepted literals, a field is repeated, or there are too many keys.
pub fn parse_sort(value: &Value, limits: &Limits) -> Result<Vec<SortKey>, FilterError> {
    let entries: Vec<(String, &Value)> = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
        Value::Array(items) => items.iter().map(sort_entry).collect::<Result<_, _>>()?,
        other => {
            return Err(FilterError::value(
                "sort",
                format!("expected an object or array, got {}", json_type_name(other)),
            ));
        }
    };

    if entries.len() > limits.max_sort_keys {
        return Err(FilterError::TooComplex(format!(
            "more than {} sort keys",
            limits.max_sort_keys
        )));
    }

    let mut keys: Vec<SortKey> = Vec::with_capacity(entries.len());
    for (name, direction) in entries {
        let field = resolve_field(&name)?;
        if keys.iter().any(|k| k.field == field) {
            return Err(FilterError::value("sort", format!("`{name}` is listed twice")));
        }
        keys.push(SortKey {
            field,
            direction: parse_direction(&name, direction)?,
        });
    }
    Ok(keys)
}

impl FilterSpec {
    /// Validate a candidate `{ "filter": ..., "sort": ... }` object
    ///
    /// # Errors
    ///
    /// Returns `FilterError` on the first disallowed field, operator, value or
    /// bound violation. A missing `filter` key is rejected rather than treated
    /// as "match everything"; pass an explicit `{}` for that.
    pub fn from_json(candidate: &Value, limits: &Limits) -> Result<Self, FilterError> {
        let Value::Object(map) = candidate else {
            return Err(FilterError::Malformed(format!(
                "expected a JSON object, got {}",
                json_type_name(candidate)
            )));
        };

        for key in map.keys().filter(|k| *k != "filter" && *k != "sort") {
            tracing::debug!(key = %key, "ignoring unrecognized key in filter specification");
        }

        let filter = match map.get("filter") {
            Some(Value::Object(filter)) => filter,
            Some(other) => {
                return Err(FilterError::Malformed(format!(
                    "`filter` must be an object, got {}",
                    json_type_name(other)
                )));
            }
            None => return Err(FilterError::Malformed("missing `filter`".into())),
        };

        let predicate = Parser::new(limits).filter_object(filter, 1)?;
        let sort = match map.get("sort") {
            Some(sort) => parse_sort(sort, limits)?,
            None => Vec::new(),
        };

        Ok(Self::new(predicate, sort))
    }

    /// Render back to the `{ "filter": ..., "sort": ... }` form accepted by [`FilterSpec::from_json`]
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert("filter".into(), self.predicate.to_json());
        let mut sort = Map::new();
        for key in &self.sort {
            let dir = match key.direction {
                SortDirection::Ascending => 1,
                SortDirection::Descending => -1,
            };
            sort.insert(key.field.name().into(), Value::from(dir));
        }
        out.insert("sort".into(), Value::Object(sort));
        Value::Object(out)
    }
}

fn scalar_json(value: &Scalar) -> Value {
    match value {
        Scalar::Text(s) => Value::String(s.clone()),
        #[allow(clippy::cast_possible_truncation)]
        Scalar::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => Value::from(*n as i64),
        Scalar::Number(n) => Value::from(*n),
        Scalar::Bool(b) => Value::Bool(*b),
        Scalar::Status(s) => Value::String(s.as_str().into()),
        Scalar::Timestamp(t) => Value::String(t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
    }
}

fn single(key: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    Value::Object(map)
}

impl Predicate {
    /// Render as a MongoDB-style filter object
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::All(children) if children.is_empty() => Value::Object(Map::new()),
            Self::All(children) => single("$and", children.iter().map(Self::to_json).collect()),
            Self::Any(children) => single("$or", children.iter().map(Self::to_json).collect()),
            Self::Compare { field, op: CompareOp::Eq, value } => single(field.name(), scalar_json(value)),
            Self::Compare { field, op: CompareOp::Ne, value } => {
                single(field.name(), single("$ne", scalar_json(value)))
            }
            Self::Range { field, lower, upper } => {
                let mut ops = Map::new();
                if let Some(b) = lower {
                    let op = if b.inclusive { "$gte" } else { "$gt" };
                    ops.insert(op.into(), scalar_json(&b.value));
                }
                if let Some(b) = upper {
                    let op = if b.inclusive { "$lte" } else { "$lt" };
                    ops.insert(op.into(), scalar_json(&b.value));
                }
                single(field.name(), Value::Object(ops))
            }
            Self::Membership { field, op, values } => {
                let name = match op {
                    SetOp::In => "$in",
                    SetOp::NotIn => "$nin",
                    SetOp::All => "$all",
                };
                let values: Value = values.iter().map(scalar_json).collect();
                single(field.name(), single(name, values))
            }
            Self::Matches { field, pattern } => {
                let mut ops = Map::new();
                ops.insert("$regex".into(), Value::String(pattern.as_str().into()));
                ops.insert("$options".into(), Value::String("i".into()));
                single(field.name(), Value::Object(ops))
            }
            Self::Exists { field, present } => {
                single(field.name(), single("$exists", Value::Bool(*present)))
            }
        }
    }
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod validate_tests;
