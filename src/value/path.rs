use std::fmt;
use std::str::FromStr;

use crate::Error;
use crate::Result;
use crate::UsageError;

/// One step from a container to one of its slots
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// A property path such as `a.b[0].c`
///
/// The empty path addresses the root value itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<PathSegment>);

impl Path {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }

    /// Parse `a.b`, `a[0]` and `a["key"]` forms
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = |reason: &str| -> Error {
            UsageError::InvalidPath {
                path: text.to_string(),
                reason: reason.to_string(),
            }
            .into()
        };

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Self::root());
        }

        let chars: Vec<char> = trimmed.chars().collect();
        let mut segments = Vec::new();
        let mut pos = 0;
        // A key is expected at the start and after every '.'
        let mut expect_key = true;

        while pos < chars.len() {
            let c = chars[pos];
            if expect_key {
                let start = pos;
                while pos < chars.len() && is_identifier_char(chars[pos]) {
                    pos += 1;
                }
                if start == pos {
                    return Err(invalid("expected a property name"));
                }
                let key: String = chars[start..pos].iter().collect();
                if key.starts_with(|c: char| c.is_ascii_digit()) {
                    return Err(invalid("property names cannot start with a digit"));
                }
                segments.push(PathSegment::Key(key));
                expect_key = false;
            } else if c == '.' {
                pos += 1;
                expect_key = true;
            } else if c == '[' {
                let close = chars[pos..]
                    .iter()
                    .position(|&c| c == ']')
                    .map(|offset| pos + offset)
                    .ok_or_else(|| invalid("unterminated '['"))?;
                let inner: String = chars[pos + 1..close].iter().collect();
                segments.push(parse_bracket(inner.trim()).ok_or_else(|| invalid("invalid bracket segment"))?);
                pos = close + 1;
            } else {
                return Err(invalid("unexpected character"));
            }
        }

        if expect_key {
            return Err(invalid("path ends with '.'"));
        }

        Ok(Self(segments))
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn child(
        &self,
        segment: PathSegment,
    ) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn parse_bracket(inner: &str) -> Option<PathSegment> {
    if let Ok(index) = inner.parse::<usize>() {
        return Some(PathSegment::Index(index));
    }
    let quoted = (inner.starts_with('"') && inner.ends_with('"'))
        || (inner.starts_with('\'') && inner.ends_with('\''));
    if quoted && inner.len() >= 2 {
        return Some(PathSegment::Key(inner[1..inner.len() - 1].to_string()));
    }
    None
}

impl FromStr for Path {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Path::parse(s)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{key}"),
            PathSegment::Index(index) => write!(f, "{index}"),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if key.chars().all(is_identifier_char) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{key}")?;
                }
                PathSegment::Key(key) => write!(f, "[{key:?}]")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}
