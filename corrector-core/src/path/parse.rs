use std::fmt;

use serde_json_path::JsonPath;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

#[derive(Debug, Clone)]
pub struct PathExpr {
    raw: String,
    kind: PathKind,
}

#[derive(Debug, Clone)]
pub(crate) enum PathKind {
    Segments(Vec<Segment>),
    Query(JsonPath),
}

impl PathExpr {
    pub fn parse(input: &str) -> Result<Self, PathError> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(PathError::Empty);
        }
        if is_query(raw) {
            let normalized = if raw.starts_with('$') {
                raw.to_string()
            } else {
                format!("$.{raw}")
            };
            let query = JsonPath::parse(&normalized)
                .map_err(|e| PathError::InvalidQuery(e.to_string()))?;
            return Ok(Self {
                raw: raw.to_string(),
                kind: PathKind::Query(query),
            });
        }
        Ok(Self {
            raw: raw.to_string(),
            kind: PathKind::Segments(parse_segments(raw)?),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_root(&self) -> bool {
        matches!(&self.kind, PathKind::Segments(s) if s.is_empty())
    }

    /// `None` for query expressions, which cannot be written through.
    pub fn segments(&self) -> Option<&[Segment]> {
        match &self.kind {
            PathKind::Segments(s) => Some(s),
            PathKind::Query(_) => None,
        }
    }

    pub(crate) fn kind(&self) -> &PathKind {
        &self.kind
    }
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn is_query(s: &str) -> bool {
    s.contains('*') || s.contains("..") || s.contains("[?")
}

fn parse_segments(raw: &str) -> Result<Vec<Segment>, PathError> {
    let rest = match raw.strip_prefix('$') {
        Some(r) => r,
        None => raw,
    };
    let chars: Vec<char> = rest.chars().collect();
    let mut segments = Vec::new();
    let mut i = 0;

    // Root-relative paths start directly with a key.
    let mut expect_key = !raw.starts_with('$');

    while i < chars.len() {
        let c = chars[i];
        if expect_key || c == '.' {
            if c == '.' {
                i += 1;
            }
            let start = i;
            while i < chars.len() && chars[i] != '.' && chars[i] != '[' {
                i += 1;
            }
            let key: String = chars[start..i].iter().collect();
            if key.is_empty() {
                return Err(PathError::EmptySegment(raw.to_string()));
            }
            segments.push(Segment::Key(key));
            expect_key = false;
        } else if c == '[' {
            i += 1;
            match chars.get(i) {
                Some(q @ ('\'' | '"')) => {
                    let quote = *q;
                    i += 1;
                    let start = i;
                    while i < chars.len() && chars[i] != quote {
                        i += 1;
                    }
                    if i >= chars.len() {
                        return Err(PathError::UnclosedBracket(raw.to_string()));
                    }
                    let key: String = chars[start..i].iter().collect();
                    i += 1;
                    if chars.get(i) != Some(&']') {
                        return Err(PathError::UnclosedBracket(raw.to_string()));
                    }
                    i += 1;
                    segments.push(Segment::Key(key));
                }
                Some(_) => {
                    let start = i;
                    while i < chars.len() && chars[i] != ']' {
                        i += 1;
                    }
                    if i >= chars.len() {
                        return Err(PathError::UnclosedBracket(raw.to_string()));
                    }
                    let digits: String = chars[start..i].iter().collect();
                    let idx = digits
                        .trim()
                        .parse::<usize>()
                        .map_err(|_| PathError::InvalidIndex(digits.clone()))?;
                    i += 1;
                    segments.push(Segment::Index(idx));
                }
                None => return Err(PathError::UnclosedBracket(raw.to_string())),
            }
        } else {
            return Err(PathError::UnexpectedChar {
                path: raw.to_string(),
                found: c,
            });
        }
    }

    Ok(segments)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("path expression must not be empty")]
    Empty,
    #[error("empty segment in path expression: {0}")]
    EmptySegment(String),
    #[error("unclosed bracket in path expression: {0}")]
    UnclosedBracket(String),
    #[error("invalid array index: {0}")]
    InvalidIndex(String),
    #[error("unexpected '{found}' in path expression: {path}")]
    UnexpectedChar { path: String, found: char },
    #[error("invalid JSONPath query: {0}")]
    InvalidQuery(String),
    #[error("query expressions are read-only: {0}")]
    NotWritable(String),
    #[error("array index {index} would pad more than {max} slots")]
    IndexTooLarge { index: usize, max: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segs(p: &str) -> Vec<Segment> {
        PathExpr::parse(p).unwrap().segments().unwrap().to_vec()
    }

    #[test]
    fn parses_dotted_and_relative_forms() {
        let expected = vec![Segment::Key("a".into()), Segment::Key("b".into())];
        assert_eq!(segs("$.a.b"), expected);
        assert_eq!(segs("a.b"), expected);
        assert!(segs("$").is_empty());
    }

    #[test]
    fn parses_brackets() {
        assert_eq!(
            segs("$.items[2].id"),
            vec![
                Segment::Key("items".into()),
                Segment::Index(2),
                Segment::Key("id".into())
            ]
        );
        assert_eq!(segs("$['first-name']"), vec![Segment::Key("first-name".into())]);
    }

    #[test]
    fn rejects_malformed() {
        assert!(matches!(PathExpr::parse("$.a[1"), Err(PathError::UnclosedBracket(_))));
        assert!(matches!(PathExpr::parse("$.a[x]"), Err(PathError::InvalidIndex(_))));
        assert!(matches!(PathExpr::parse("  "), Err(PathError::Empty)));
        assert!(matches!(PathExpr::parse("$a"), Err(PathError::UnexpectedChar { .. })));
    }

    #[test]
    fn wildcard_becomes_query() {
        let p = PathExpr::parse("$.items[*].id").unwrap();
        assert!(p.segments().is_none());
    }
}
