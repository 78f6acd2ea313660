use serde_json::{Map, Value as JsonValue};

use super::parse::{PathError, PathExpr, PathKind, Segment};

/// Largest number of `null` slots a single write may append to an array.
pub const MAX_ARRAY_PAD: usize = 10_000;

/// Read the value at `path`. Missing segments and malformed expressions both
/// yield `None`.
pub fn get(tree: &JsonValue, path: &str) -> Option<JsonValue> {
    match PathExpr::parse(path) {
        Ok(expr) => expr.get(tree),
        Err(e) => {
            tracing::debug!(path = %path, error = %e, "unreadable path expression");
            None
        }
    }
}

/// Borrowing variant of [`get`]; query expressions are not supported here.
pub fn get_ref<'a>(tree: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    let expr = PathExpr::parse(path).ok()?;
    walk(tree, expr.segments()?)
}

/// Write `value` at `path`, creating intermediate objects/arrays on demand.
pub fn set(tree: &mut JsonValue, path: &str, value: JsonValue) -> Result<(), PathError> {
    PathExpr::parse(path)?.set(tree, value)
}

pub fn delete(tree: &mut JsonValue, path: &str) -> Option<JsonValue> {
    PathExpr::parse(path).ok()?.delete(tree)
}

/// Undefined, `null`, `false`, `0` and `""` are falsy.
pub fn is_truthy(value: Option<&JsonValue>) -> bool {
    match value {
        None | Some(JsonValue::Null) => false,
        Some(JsonValue::Bool(b)) => *b,
        Some(JsonValue::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Some(JsonValue::String(s)) => !s.is_empty(),
        Some(JsonValue::Array(_)) | Some(JsonValue::Object(_)) => true,
    }
}

impl PathExpr {
    pub fn get(&self, tree: &JsonValue) -> Option<JsonValue> {
        match self.kind() {
            PathKind::Segments(segments) => walk(tree, segments).cloned(),
            PathKind::Query(query) => {
                let mut matches = query.query(tree).all();
                match matches.len() {
                    0 => None,
                    1 => matches.pop().cloned(),
                    _ => Some(JsonValue::Array(matches.into_iter().cloned().collect())),
                }
            }
        }
    }

    pub fn set(&self, tree: &mut JsonValue, value: JsonValue) -> Result<(), PathError> {
        let segments = self
            .segments()
            .ok_or_else(|| PathError::NotWritable(self.as_str().to_string()))?;
        let Some((last, parents)) = segments.split_last() else {
            *tree = value;
            return Ok(());
        };

        let mut cur = tree;
        for seg in parents {
            cur = child_mut(cur, seg)?;
        }
        match last {
            Segment::Key(k) => {
                ensure_object(cur).insert(k.clone(), value);
            }
            Segment::Index(i) => {
                *slot_mut(ensure_array(cur), *i)? = value;
            }
        }
        Ok(())
    }

    pub fn delete(&self, tree: &mut JsonValue) -> Option<JsonValue> {
        let (last, parents) = self.segments()?.split_last()?;
        let mut cur = tree;
        for seg in parents {
            cur = match (seg, cur) {
                (Segment::Key(k), JsonValue::Object(m)) => m.get_mut(k)?,
                (Segment::Index(i), JsonValue::Array(a)) => a.get_mut(*i)?,
                _ => return None,
            };
        }
        match (last, cur) {
            (Segment::Key(k), JsonValue::Object(m)) => m.remove(k),
            (Segment::Index(i), JsonValue::Array(a)) if *i < a.len() => Some(a.remove(*i)),
            _ => None,
        }
    }
}

fn walk<'a>(tree: &'a JsonValue, segments: &[Segment]) -> Option<&'a JsonValue> {
    let mut cur = tree;
    for seg in segments {
        cur = match (seg, cur) {
            (Segment::Key(k), JsonValue::Object(m)) => m.get(k)?,
            // `items.0.id` addresses arrays too.
            (Segment::Key(k), JsonValue::Array(a)) => a.get(k.parse::<usize>().ok()?)?,
            (Segment::Index(i), JsonValue::Array(a)) => a.get(*i)?,
            _ => return None,
        };
    }
    Some(cur)
}

fn child_mut<'a>(cur: &'a mut JsonValue, seg: &Segment) -> Result<&'a mut JsonValue, PathError> {
    match seg {
        Segment::Key(k) => Ok(ensure_object(cur)
            .entry(k.clone())
            .or_insert(JsonValue::Null)),
        Segment::Index(i) => slot_mut(ensure_array(cur), *i),
    }
}

/// Borrow `arr[index]`, padding with `null` up to `index` within [`MAX_ARRAY_PAD`].
fn slot_mut(arr: &mut Vec<JsonValue>, index: usize) -> Result<&mut JsonValue, PathError> {
    if arr.len() <= index {
        let too_large = PathError::IndexTooLarge {
            index,
            max: MAX_ARRAY_PAD,
        };
        let new_len = index.checked_add(1).ok_or_else(|| too_large.clone())?;
        if new_len - arr.len() > MAX_ARRAY_PAD {
            return Err(too_large);
        }
        arr.resize(new_len, JsonValue::Null);
    }
    Ok(&mut arr[index])
}

fn ensure_object(v: &mut JsonValue) -> &mut Map<String, JsonValue> {
    if !v.is_object() {
        *v = JsonValue::Object(Map::new());
    }
    match v {
        JsonValue::Object(m) => m,
        _ => unreachable!("value was just replaced with an object"),
    }
}

fn ensure_array(v: &mut JsonValue) -> &mut Vec<JsonValue> {
    if !v.is_array() {
        *v = JsonValue::Array(Vec::new());
    }
    match v {
        JsonValue::Array(a) => a,
        _ => unreachable!("value was just replaced with an array"),
    }
}
