//! Dotted field paths and their script accessor form.

use crate::error::{DocsyncError, Result};
use std::fmt;

/// Root every generated accessor hangs off.
pub const SOURCE_ROOT: &str = "ctx._source";

const POSITIONAL: &str = "$";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// A parsed dotted path such as `ratings.0.rating`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    segments: Vec<Segment>,
}

impl FieldPath {
    /// Parse a dotted path.
    ///
    /// Purely numeric segments become array indexes. A `$` segment is
    /// rejected with [`DocsyncError::UnsupportedPath`]; empty paths and
    /// empty segments with [`DocsyncError::InvalidMutator`].
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(DocsyncError::InvalidMutator(
                "field path cannot be empty".to_string(),
            ));
        }

        let mut segments = Vec::new();
        for part in raw.split('.') {
            if part == POSITIONAL {
                return Err(DocsyncError::UnsupportedPath(raw.to_string()));
            }
            if part.is_empty() {
                return Err(DocsyncError::InvalidMutator(format!(
                    "field path '{}' has an empty segment",
                    raw
                )));
            }
            let segment = if part.bytes().all(|b| b.is_ascii_digit()) {
                match part.parse::<usize>() {
                    Ok(i) => Segment::Index(i),
                    Err(_) => Segment::Key(part.to_string()),
                }
            } else {
                Segment::Key(part.to_string())
            };
            segments.push(segment);
        }

        Ok(FieldPath {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// `ctx._source` followed by the path, with indexes as subscripts:
    /// `tags.1` → `ctx._source.tags[1]`.
    pub fn accessor(&self) -> String {
        render_accessor(&self.segments)
    }

    /// Accessor of the parent container and the leaf name, or `None` for a
    /// single-segment path.
    pub fn split_leaf(&self) -> Option<(String, String)> {
        let (leaf, parents) = self.segments.split_last()?;
        if parents.is_empty() {
            return None;
        }
        let leaf = match leaf {
            Segment::Key(k) => k.clone(),
            Segment::Index(i) => i.to_string(),
        };
        Some((render_accessor(parents), leaf))
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn render_accessor(segments: &[Segment]) -> String {
    let mut out = String::from(SOURCE_ROOT);
    for segment in segments {
        match segment {
            Segment::Key(k) => {
                out.push('.');
                out.push_str(k);
            }
            Segment::Index(i) => {
                out.push('[');
                out.push_str(&i.to_string());
                out.push(']');
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_path_stays_dotted() {
        let p = FieldPath::parse("profile.name").unwrap();
        assert_eq!(p.accessor(), "ctx._source.profile.name");
    }

    #[test]
    fn numeric_segment_becomes_subscript() {
        let p = FieldPath::parse("tags.1").unwrap();
        assert_eq!(p.accessor(), "ctx._source.tags[1]");
    }

    #[test]
    fn subscript_in_the_middle() {
        let p = FieldPath::parse("ratings.0.rating").unwrap();
        assert_eq!(p.accessor(), "ctx._source.ratings[0].rating");
        assert_eq!(
            p.segments(),
            &[
                Segment::Key("ratings".into()),
                Segment::Index(0),
                Segment::Key("rating".into())
            ]
        );
    }

    #[test]
    fn positional_placeholder_rejected() {
        let err = FieldPath::parse("grades.$").unwrap_err();
        assert!(matches!(err, DocsyncError::UnsupportedPath(p) if p == "grades.$"));
    }

    #[test]
    fn positional_placeholder_rejected_mid_path() {
        assert!(matches!(
            FieldPath::parse("grades.$.score"),
            Err(DocsyncError::UnsupportedPath(_))
        ));
    }

    #[test]
    fn dollar_inside_a_key_is_a_key() {
        let p = FieldPath::parse("price$usd").unwrap();
        assert_eq!(p.accessor(), "ctx._source.price$usd");
    }

    #[test]
    fn empty_segments_rejected() {
        assert!(matches!(
            FieldPath::parse(""),
            Err(DocsyncError::InvalidMutator(_))
        ));
        assert!(matches!(
            FieldPath::parse("profile..name"),
            Err(DocsyncError::InvalidMutator(_))
        ));
    }

    #[test]
    fn split_leaf_of_nested_path() {
        let p = FieldPath::parse("profile.age").unwrap();
        assert_eq!(
            p.split_leaf(),
            Some(("ctx._source.profile".to_string(), "age".to_string()))
        );
    }

    #[test]
    fn split_leaf_of_top_level_path_is_none() {
        let p = FieldPath::parse("name").unwrap();
        assert_eq!(p.split_leaf(), None);
    }
}
