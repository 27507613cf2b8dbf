//! A conservative JSON-Schema evaluator.
//!
//! The keywords that describe the shape of a STAC envelope are checked:
//! `type`, `required`, `properties`, `items`, `const`, `enum`, `minItems`,
//! `allOf`, `anyOf`, `oneOf` and `$ref`. Other keywords are ignored, so a
//! document that passes here may still fail a full validator.
//!
//! Local references (`#/definitions/...`) are resolved against the schema
//! document they appear in. Other references are made absolute against that
//! document's `$id` and loaded through a [`SchemaSource`]. A reference that
//! cannot be loaded is counted as unresolved: it neither passes nor fails,
//! and a `oneOf`/`anyOf` branch that depends on one is treated as
//! undecided. As in draft-07, keywords next to a `$ref` are ignored.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::error::Violation;

/// Guards against `$ref` chains that never consume any of the value.
const MAX_REF_DEPTH: usize = 64;

/// Loads schema documents named by non-local `$ref`s.
pub trait SchemaSource {
    /// The schema document at the absolute `href`, if it can be loaded.
    fn fetch(&self, href: &str) -> Option<Arc<Value>>;
}

/// A source that loads nothing; only local references resolve.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalOnly;

impl SchemaSource for LocalOnly {
    fn fetch(&self, _href: &str) -> Option<Arc<Value>> {
        None
    }
}

/// Check `value` against `schema`, appending every failure to `out`.
/// Only local references are followed.
pub fn check(schema: &Value, value: &Value, out: &mut Vec<Violation>) {
    check_with(schema, value, &LocalOnly, out);
}

/// Check `value` against `schema`, loading external references through
/// `source`. Returns the number of references that could not be resolved.
pub fn check_with(
    schema: &Value,
    value: &Value,
    source: &dyn SchemaSource,
    out: &mut Vec<Violation>,
) -> usize {
    let mut checker = Checker {
        source,
        unresolved: 0,
        depth: 0,
    };
    let scope = Scope::of(schema, None);
    checker.check_at(scope, schema, value, "", out);
    checker.unresolved
}

/// The schema document a subschema belongs to, and its base URI.
#[derive(Clone, Copy)]
struct Scope<'s> {
    root: &'s Value,
    base: Option<&'s str>,
}

impl<'s> Scope<'s> {
    fn of(root: &'s Value, fallback: Option<&'s str>) -> Self {
        let base = root.get("$id").and_then(Value::as_str).or(fallback);
        Self { root, base }
    }
}

enum Outcome {
    Pass,
    Fail,
    Undecided,
}

struct Checker<'a> {
    source: &'a dyn SchemaSource,
    unresolved: usize,
    depth: usize,
}

impl Checker<'_> {
    fn check_at(
        &mut self,
        scope: Scope<'_>,
        schema: &Value,
        value: &Value,
        path: &str,
        out: &mut Vec<Violation>,
    ) {
        let Value::Object(schema) = schema else {
            // `true`, `false` and non-object schemas.
            if schema == &Value::Bool(false) {
                push(out, path, "no value is allowed here".to_string());
            }
            return;
        };

        if let Some(Value::String(reference)) = schema.get("$ref") {
            self.check_ref(scope, reference, value, path, out);
            return;
        }

        if let Some(expected) = schema.get("type") {
            if !matches_type(expected, value) {
                push(out, path, format!("expected type {expected}, got {}", type_name(value)));
                return;
            }
        }

        if let Some(constant) = schema.get("const") {
            if constant != value {
                push(out, path, format!("expected {constant}, got {value}"));
            }
        }

        if let Some(Value::Array(options)) = schema.get("enum") {
            if !options.contains(value) {
                push(out, path, format!("{value} is not one of {}", Value::Array(options.clone())));
            }
        }

        if let Value::Object(object) = value {
            self.check_object(scope, schema, object, path, out);
        }

        if let Value::Array(array) = value {
            if let Some(min) = schema.get("minItems").and_then(Value::as_u64) {
                if (array.len() as u64) < min {
                    push(out, path, format!("expected at least {min} items, got {}", array.len()));
                }
            }
            if let Some(items) = schema.get("items") {
                for (index, element) in array.iter().enumerate() {
                    self.check_at(scope, items, element, &format!("{path}/{index}"), out);
                }
            }
        }

        if let Some(Value::Array(all)) = schema.get("allOf") {
            for sub in all {
                self.check_at(scope, sub, value, path, out);
            }
        }

        if let Some(Value::Array(any)) = schema.get("anyOf") {
            let (passing, undecided) = self.count_branches(scope, any, value);
            if !any.is_empty() && passing == 0 && undecided == 0 {
                push(out, path, "does not match any schema in anyOf".to_string());
            }
        }

        if let Some(Value::Array(one)) = schema.get("oneOf") {
            let (passing, undecided) = self.count_branches(scope, one, value);
            if passing > 1 {
                push(out, path, format!("matches {passing} schemas in oneOf, expected exactly 1"));
            } else if !one.is_empty() && passing == 0 && undecided == 0 {
                push(out, path, "does not match any schema in oneOf".to_string());
            }
        }
    }

    fn check_object(
        &mut self,
        scope: Scope<'_>,
        schema: &Map<String, Value>,
        object: &Map<String, Value>,
        path: &str,
        out: &mut Vec<Violation>,
    ) {
        if let Some(Value::Array(required)) = schema.get("required") {
            for key in required.iter().filter_map(Value::as_str) {
                if !object.contains_key(key) {
                    push(out, path, format!("missing required property {key:?}"));
                }
            }
        }
        if let Some(Value::Object(properties)) = schema.get("properties") {
            for (key, sub) in properties {
                if let Some(child) = object.get(key) {
                    self.check_at(scope, sub, child, &format!("{path}/{}", escape(key)), out);
                }
            }
        }
    }

    fn check_ref(
        &mut self,
        scope: Scope<'_>,
        reference: &str,
        value: &Value,
        path: &str,
        out: &mut Vec<Violation>,
    ) {
        if self.depth >= MAX_REF_DEPTH {
            self.unresolved(reference);
            return;
        }
        let (document, fragment) = reference.split_once('#').unwrap_or((reference, ""));
        self.depth += 1;
        if document.is_empty() {
            match scope.root.pointer(fragment) {
                Some(target) => self.check_at(scope, target, value, path, out),
                None => self.unresolved(reference),
            }
        } else {
            let loaded = absolute(scope.base, document)
                .and_then(|href| self.source.fetch(&href).map(|root| (href, root)));
            match loaded {
                Some((href, root)) => {
                    let inner = Scope::of(root.as_ref(), Some(href.as_str()));
                    match root.pointer(fragment) {
                        Some(target) => self.check_at(inner, target, value, path, out),
                        None => self.unresolved(reference),
                    }
                }
                None => self.unresolved(reference),
            }
        }
        self.depth -= 1;
    }

    fn unresolved(&mut self, reference: &str) {
        debug!(reference, "unresolved schema reference");
        self.unresolved += 1;
    }

    /// Evaluate combinator branches: `(passing, undecided)`.
    fn count_branches(&mut self, scope: Scope<'_>, schemas: &[Value], value: &Value) -> (usize, usize) {
        let mut passing = 0;
        let mut undecided = 0;
        for sub in schemas {
            match self.branch(scope, sub, value) {
                Outcome::Pass => passing += 1,
                Outcome::Undecided => undecided += 1,
                Outcome::Fail => {}
            }
        }
        (passing, undecided)
    }

    fn branch(&mut self, scope: Scope<'_>, schema: &Value, value: &Value) -> Outcome {
        let before = self.unresolved;
        let mut scratch = Vec::new();
        self.check_at(scope, schema, value, "", &mut scratch);
        if !scratch.is_empty() {
            Outcome::Fail
        } else if self.unresolved > before {
            Outcome::Undecided
        } else {
            Outcome::Pass
        }
    }
}

/// Resolve the document part of a reference against a base URI.
fn absolute(base: Option<&str>, document: &str) -> Option<String> {
    let url = match base.and_then(|base| Url::parse(base).ok()) {
        Some(base) => base.join(document).ok()?,
        None => Url::parse(document).ok()?,
    };
    Some(url.into())
}

fn matches_type(expected: &Value, value: &Value) -> bool {
    match expected {
        Value::String(name) => is_type(name, value),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .any(|name| is_type(name, value)),
        _ => true,
    }
}

fn is_type(name: &str, value: &Value) -> bool {
    match name {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64() || is_integral_float(value),
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn is_integral_float(value: &Value) -> bool {
    value.as_f64().is_some_and(|f| f.fract() == 0.0)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Escape a key for use as a JSON pointer segment.
fn escape(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

fn push(out: &mut Vec<Violation>, path: &str, message: String) {
    out.push(Violation {
        path: path.to_string(),
        message,
    });
}
