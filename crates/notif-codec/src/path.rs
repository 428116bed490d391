//! Object paths into a resource tree
//!
//! Paths use dot-separated keys with bracketed array indices:
//! `steps[0].template.body`. The extraction compiler sorts by depth and the
//! annotation side channel matches on the index-stripped form
//! (`steps.template.body`), so both renderings live here.

use std::fmt;

/// A segment of an object path - either a key or an array index
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathSegment {
    /// A key in an object (e.g. "template" in "steps[0].template")
    Key(String),
    /// An index in an array (e.g. 0 in `steps[0]`)
    Index(usize),
}

/// A parsed path into a resource tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ObjectPath {
    segments: Vec<PathSegment>,
}

impl ObjectPath {
    /// The empty path (the tree root).
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a dot/bracket path string.
    pub fn parse(path: &str) -> Self {
        let mut segments = Vec::new();
        let mut current_key = String::new();
        let mut chars = path.chars().peekable();

        while let Some(ch) = chars.next() {
            match ch {
                '.' => {
                    if !current_key.is_empty() {
                        segments.push(PathSegment::Key(std::mem::take(&mut current_key)));
                    }
                }
                '[' => {
                    if !current_key.is_empty() {
                        segments.push(PathSegment::Key(std::mem::take(&mut current_key)));
                    }
                    let mut index_str = String::new();
                    for ch in chars.by_ref() {
                        if ch == ']' {
                            break;
                        }
                        index_str.push(ch);
                    }
                    if let Ok(index) = index_str.parse::<usize>() {
                        segments.push(PathSegment::Index(index));
                    }
                }
                _ => current_key.push(ch),
            }
        }

        if !current_key.is_empty() {
            segments.push(PathSegment::Key(current_key));
        }

        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Extend with a key segment.
    pub fn child_key(&self, key: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Key(key.to_string()));
        Self { segments }
    }

    /// Extend with an index segment.
    pub fn child_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }

    /// Append every segment of `other`.
    pub fn concat(&self, other: &Self) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }

    /// The path without its last segment, plus that segment.
    pub fn split_last(&self) -> Option<(Self, &PathSegment)> {
        let (last, rest) = self.segments.split_last()?;
        Some((
            Self {
                segments: rest.to_vec(),
            },
            last,
        ))
    }

    /// The final key segment, if the path ends in a key.
    pub fn last_key(&self) -> Option<&str> {
        match self.segments.last()? {
            PathSegment::Key(k) => Some(k),
            PathSegment::Index(_) => None,
        }
    }

    /// True if `self` is a strict prefix of `other`.
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        self.segments.len() < other.segments.len()
            && other.segments[..self.segments.len()] == self.segments[..]
    }

    /// Render with array indices dropped: `steps[0].template.body` becomes
    /// `steps.template.body`. Annotation entries match on this form so one
    /// entry covers every element of an array.
    pub fn stripped(&self) -> String {
        let keys: Vec<&str> = self
            .segments
            .iter()
            .filter_map(|s| match s {
                PathSegment::Key(k) => Some(k.as_str()),
                PathSegment::Index(_) => None,
            })
            .collect();
        keys.join(".")
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(k) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", k)?;
                }
                PathSegment::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_and_render() {
        let path = ObjectPath::parse("steps[0].template.body");
        assert_eq!(
            path.segments(),
            &[
                PathSegment::Key("steps".to_string()),
                PathSegment::Index(0),
                PathSegment::Key("template".to_string()),
                PathSegment::Key("body".to_string()),
            ]
        );
        assert_eq!(path.to_string(), "steps[0].template.body");
    }

    #[test]
    fn test_stripped_drops_indices() {
        let path = ObjectPath::parse("pages[2].blocks[0].content");
        assert_eq!(path.stripped(), "pages.blocks.content");
    }

    #[test]
    fn test_split_last_and_ancestor() {
        let path = ObjectPath::parse("template.body");
        let (parent, last) = path.split_last().unwrap();
        assert_eq!(parent.to_string(), "template");
        assert_eq!(last, &PathSegment::Key("body".to_string()));
        assert!(parent.is_ancestor_of(&path));
        assert!(!path.is_ancestor_of(&parent));
        assert!(!path.is_ancestor_of(&path.clone()));
    }

    #[test]
    fn test_root_is_empty() {
        let root = ObjectPath::root();
        assert!(root.is_root());
        assert_eq!(root.depth(), 0);
        assert_eq!(root.to_string(), "");
    }
}
