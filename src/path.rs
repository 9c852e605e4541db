//! Incremental locator for diagnostics: `$['properties']['x']['oneOf'][1]`.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaPath {
    segments: Vec<Segment>,
}

impl SchemaPath {
    pub fn root() -> Self {
        Self::default()
    }
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut out = self.clone();
        out.segments.push(Segment::Key(key.into()));
        out
    }
    pub fn index(&self, index: usize) -> Self {
        let mut out = self.clone();
        out.segments.push(Segment::Index(index));
        out
    }
    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.segments {
            match segment {
                Segment::Key(key) => write!(f, "['{key}']")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}
