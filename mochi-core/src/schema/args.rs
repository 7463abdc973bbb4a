//! Narrowing of loosely-typed tool arguments
//!
//! `ArgReader` walks a JSON object and collects one `FieldViolation` per bad
//! field instead of stopping at the first one, so a request parser can report
//! every problem in a single `Validation` error.

use crate::error::{FieldViolation, MochiError, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Collects typed fields and violations from a tool argument object
pub(crate) struct ArgReader<'a> {
    /// `None` when the caller sent no argument bag at all
    args: Option<&'a Map<String, Value>>,
    violations: Vec<FieldViolation>,
}

impl<'a> ArgReader<'a> {
    /// Start reading `args`; a missing argument bag (`null`) reads as `{}`.
    pub(crate) fn new(args: &'a Value) -> Result<Self> {
        let args = match args {
            Value::Object(map) => Some(map),
            Value::Null => None,
            _ => {
                return Err(MochiError::validation(FieldViolation::new(
                    "arguments",
                    "arguments must be a JSON object",
                )));
            }
        };

        Ok(Self {
            args,
            violations: Vec::new(),
        })
    }

    /// Present and non-null
    fn value(&self, field: &str) -> Option<&'a Value> {
        self.args?.get(field).filter(|v| !v.is_null())
    }

    /// Required non-empty string
    pub(crate) fn required_str(&mut self, field: &str) -> Option<String> {
        match self.value(field) {
            None => {
                self.violations.push(FieldViolation::missing(field));
                None
            }
            Some(value) => self.non_empty_str(field, value),
        }
    }

    /// Required id that is used as a single URL path segment
    pub(crate) fn required_path_id(&mut self, field: &str) -> Option<String> {
        let id = self.required_str(field)?;
        match check_path_id(field, &id) {
            Ok(()) => Some(id),
            Err(violation) => {
                self.violations.push(violation);
                None
            }
        }
    }

    /// Optional string; when present it must be a non-empty string
    pub(crate) fn optional_non_empty_str(&mut self, field: &str) -> Option<String> {
        let value = self.value(field)?;
        self.non_empty_str(field, value)
    }

    /// Optional string; empty strings are allowed
    pub(crate) fn optional_str(&mut self, field: &str) -> Option<String> {
        match self.value(field)? {
            Value::String(s) => Some(s.clone()),
            _ => {
                self.violations.push(FieldViolation::invalid(field, "a string"));
                None
            }
        }
    }

    fn non_empty_str(&mut self, field: &str, value: &Value) -> Option<String> {
        match value {
            Value::String(s) if s.trim().is_empty() => {
                self.violations.push(FieldViolation::empty(field));
                None
            }
            Value::String(s) => Some(s.clone()),
            _ => {
                self.violations.push(FieldViolation::invalid(field, "a string"));
                None
            }
        }
    }

    /// Optional boolean
    pub(crate) fn optional_bool(&mut self, field: &str) -> Option<bool> {
        match self.value(field)? {
            Value::Bool(b) => Some(*b),
            _ => {
                self.violations.push(FieldViolation::invalid(field, "a boolean"));
                None
            }
        }
    }

    /// Optional string that must equal `literal`
    pub(crate) fn optional_literal(&mut self, field: &str, literal: &str) -> Option<String> {
        match self.value(field)? {
            Value::String(s) if s == literal => Some(s.clone()),
            _ => {
                self.violations.push(FieldViolation::invalid(
                    field,
                    &format!("the string \"{}\"", literal),
                ));
                None
            }
        }
    }

    /// Optional integer in the inclusive range `[min, max]`
    pub(crate) fn optional_int_in(&mut self, field: &str, min: u32, max: u32) -> Option<u32> {
        let value = self.value(field)?;
        let expected = format!("an integer between {} and {}", min, max);

        match value.as_u64() {
            Some(n) if n >= u64::from(min) && n <= u64::from(max) => Some(n as u32),
            Some(_) => {
                self.violations.push(FieldViolation::new(
                    field,
                    format!("field '{}' must be between {} and {}", field, min, max),
                ));
                None
            }
            None => {
                self.violations.push(FieldViolation::invalid(field, &expected));
                None
            }
        }
    }

    /// Optional array of strings
    pub(crate) fn optional_str_list(&mut self, field: &str) -> Option<Vec<String>> {
        let value = self.value(field)?;
        let items = value.as_array().and_then(|items| {
            items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
        });

        if items.is_none() {
            self.violations
                .push(FieldViolation::invalid(field, "an array of strings"));
        }
        items
    }

    /// Optional object mapping field id to `{ "id": string, "value": string }`.
    ///
    /// A bare string value is accepted as shorthand for `{ id: key, value }`.
    pub(crate) fn optional_field_values(
        &mut self,
        field: &str,
    ) -> Option<BTreeMap<String, super::FieldValue>> {
        let value = self.value(field)?;
        let Some(map) = value.as_object() else {
            self.violations.push(FieldViolation::invalid(field, "an object"));
            return None;
        };

        let mut out = BTreeMap::new();
        let before = self.violations.len();

        for (key, entry) in map {
            let path = format!("{}.{}", field, key);
            match entry {
                Value::String(s) => {
                    out.insert(key.clone(), super::FieldValue::new(key.clone(), s.clone()));
                }
                Value::Object(obj) => {
                    let id = match obj.get("id") {
                        None | Some(Value::Null) => Some(key.clone()),
                        Some(Value::String(id)) if !id.is_empty() => Some(id.clone()),
                        Some(_) => {
                            self.violations.push(FieldViolation::invalid(
                                format!("{}.id", path),
                                "a non-empty string",
                            ));
                            None
                        }
                    };
                    let value = match obj.get("value") {
                        Some(Value::String(v)) => Some(v.clone()),
                        None | Some(Value::Null) => {
                            self.violations
                                .push(FieldViolation::missing(format!("{}.value", path)));
                            None
                        }
                        Some(_) => {
                            self.violations.push(FieldViolation::invalid(
                                format!("{}.value", path),
                                "a string",
                            ));
                            None
                        }
                    };
                    if let (Some(id), Some(value)) = (id, value) {
                        out.insert(key.clone(), super::FieldValue::new(id, value));
                    }
                }
                _ => {
                    self.violations.push(FieldViolation::invalid(
                        path,
                        "an object with 'id' and 'value' strings",
                    ));
                }
            }
        }

        (self.violations.len() == before).then_some(out)
    }

    /// Finish reading: `Ok(())` if no violations were recorded
    pub(crate) fn finish(self) -> Result<()> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(MochiError::Validation(self.violations))
        }
    }
}

/// Reject ids that cannot stand alone as one URL path segment: blank ids
/// and the `.`/`..` dot-segments that URL resolution would collapse
pub(crate) fn check_path_id(field: &str, id: &str) -> std::result::Result<(), FieldViolation> {
    if id.trim().is_empty() {
        Err(FieldViolation::empty(field))
    } else if matches!(id, "." | "..") {
        Err(FieldViolation::new(
            field,
            format!("field '{}' must not be '.' or '..'", field),
        ))
    } else {
        Ok(())
    }
}
