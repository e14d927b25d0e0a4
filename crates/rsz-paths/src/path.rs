use std::fmt::{self, Write};
use std::str::FromStr;

use crate::error::{PathError, PathResult};

/// Separator between path segments.
pub const SEPARATOR: char = '/';
/// Marker introducing an occurrence number.
pub const OCCURRENCE_MARKER: char = '#';
/// Escapes a separator, marker or escape character inside a name.
pub const ESCAPE: char = '\\';

/// One hop of a path: a node name and its 1-based occurrence among
/// same-named siblings.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PathSegment {
    pub name: String,
    pub occurrence: usize,
}

impl PathSegment {
    pub fn new(name: impl Into<String>, occurrence: usize) -> Self {
        Self {
            name: name.into(),
            occurrence,
        }
    }

    /// Parse `name` or `name#n`.
    ///
    /// A `#` followed by anything other than a decimal number is part of the
    /// name, as is any character after a `\`. `#0` is rejected.
    pub fn parse(segment: &str) -> PathResult<Self> {
        if segment.is_empty() {
            return Err(PathError::EmptySegment {
                path: segment.to_string(),
            });
        }

        let mut name = String::with_capacity(segment.len());
        // Name length and suffix start at the last unescaped marker.
        let mut marker = None;
        let mut chars = segment.char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                ESCAPE => name.push(chars.next().map_or(ESCAPE, |(_, escaped)| escaped)),
                OCCURRENCE_MARKER => {
                    marker = Some((name.len(), i + 1));
                    name.push(c);
                }
                _ => name.push(c),
            }
        }

        if let Some((name_len, digits_at)) = marker {
            let digits = &segment[digits_at..];
            if name_len > 0 && !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                let occurrence = digits
                    .parse::<usize>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| PathError::InvalidOccurrence {
                        segment: segment.to_string(),
                    })?;
                name.truncate(name_len);
                return Ok(Self::new(name, occurrence));
            }
        }
        Ok(Self::new(name, 1))
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.name.chars() {
            if matches!(c, SEPARATOR | OCCURRENCE_MARKER | ESCAPE) {
                f.write_char(ESCAPE)?;
            }
            f.write_char(c)?;
        }
        if self.occurrence != 1 {
            write!(f, "{OCCURRENCE_MARKER}{}", self.occurrence)?;
        }
        Ok(())
    }
}

/// Split on separators that are not escaped.
fn split_segments(path: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in path.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            ESCAPE => escaped = true,
            SEPARATOR => {
                segments.push(&path[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    segments.push(&path[start..]);
    segments
}

/// A parsed object path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectPath {
    segments: Vec<PathSegment>,
}

impl ObjectPath {
    /// A single-segment path naming a root.
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            segments: vec![PathSegment::new(name, 1)],
        }
    }

    /// A single-segment path naming one of several roots.
    pub fn from_root(segment: PathSegment) -> Self {
        Self {
            segments: vec![segment],
        }
    }

    pub fn parse(path: &str) -> PathResult<Self> {
        if path.is_empty() {
            return Err(PathError::Empty);
        }
        let segments = split_segments(path)
            .into_iter()
            .map(|s| {
                if s.is_empty() {
                    Err(PathError::EmptySegment {
                        path: path.to_string(),
                    })
                } else {
                    PathSegment::parse(s)
                }
            })
            .collect::<PathResult<Vec<_>>>()?;
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Number of hops, root included.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn last(&self) -> &PathSegment {
        // Construction guarantees at least one segment.
        &self.segments[self.segments.len() - 1]
    }

    /// The path one level up, or `None` for a root path.
    pub fn parent(&self) -> Option<ObjectPath> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// A child path.
    pub fn join(&self, segment: PathSegment) -> ObjectPath {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    /// Returns `true` if `self` lies strictly below `ancestor`.
    pub fn is_descendant_of(&self, ancestor: &ObjectPath) -> bool {
        self.segments.len() > ancestor.segments.len()
            && self.segments.starts_with(&ancestor.segments)
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for ObjectPath {
    type Err = PathError;

    fn from_str(s: &str) -> PathResult<Self> {
        Self::parse(s)
    }
}
