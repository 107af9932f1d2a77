use serde_json::{Map, Value};

/// Default limit on how deep the resolver will descend
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Finds a named field anywhere inside a nested JSON document.
///
/// Search order is depth-first. At each object the direct keys are checked
/// first; only then are the values visited in insertion order, recursing into
/// objects and into the object elements of arrays. The first non-null match
/// wins, so a shallow key found early shadows any deeper key of the same name.
#[derive(Debug, Clone, Copy)]
pub struct FieldResolver {
    max_depth: usize,
}

impl Default for FieldResolver {
    fn default() -> Self {
        FieldResolver::new(DEFAULT_MAX_DEPTH)
    }
}

impl FieldResolver {
    pub fn new(max_depth: usize) -> Self {
        FieldResolver { max_depth }
    }

    /// Resolve `name` in `document`, `None` if it is absent or its first match is null
    pub fn resolve<'a>(&self, document: &'a Value, name: &str) -> Option<&'a Value> {
        match document {
            Value::Object(obj) => self.search_object(obj, name, 0),
            _ => None,
        }
    }

    fn search_object<'a>(
        &self,
        obj: &'a Map<String, Value>,
        name: &str,
        depth: usize,
    ) -> Option<&'a Value> {
        if depth > self.max_depth {
            return None;
        }

        // A direct key ends the search at this level, even when it is null
        if let Some(value) = obj.get(name) {
            return (!value.is_null()).then_some(value);
        }

        for value in obj.values() {
            let found = match value {
                Value::Object(child) => self.search_object(child, name, depth + 1),
                Value::Array(items) => items.iter().find_map(|item| match item {
                    Value::Object(child) => self.search_object(child, name, depth + 1),
                    _ => None,
                }),
                _ => None,
            };

            if found.is_some() {
                return found;
            }
        }

        None
    }
}
