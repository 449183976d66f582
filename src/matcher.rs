//! Path matching.
//!
//! Matches request paths against endpoint path patterns made of static
//! segments and `:param` segments.

use std::collections::HashMap;

/// Path parameters bound during matching.
pub type PathParams = HashMap<String, String>;

/// A compiled path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    segments: Vec<TemplateSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TemplateSegment {
    Literal(String),
    Param(String),
}

impl TemplateSegment {
    fn parse(segment: &str) -> Self {
        if let Some(name) = segment.strip_prefix(':') {
            return TemplateSegment::Param(name.to_string());
        }
        // `{id}` is accepted as a spelling of `:id`.
        if let Some(name) = segment
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
        {
            return TemplateSegment::Param(name.to_string());
        }
        TemplateSegment::Literal(segment.to_string())
    }
}

/// Split a path on `/`, dropping empty segments.
pub fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

impl PathTemplate {
    pub fn parse(pattern: &str) -> Self {
        Self {
            segments: split_path(pattern).map(TemplateSegment::parse).collect(),
        }
    }

    /// True if the pattern is a single parameter segment such as `:id`.
    pub fn is_bare_param(&self) -> bool {
        matches!(self.segments.as_slice(), [TemplateSegment::Param(_)])
    }

    /// Match a request path, returning the bound parameters.
    ///
    /// A bare parameter pattern binds the last request segment and matches
    /// any non-empty path. Otherwise segment counts must agree and every
    /// literal segment must be equal, case-sensitively.
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let request: Vec<&str> = split_path(path).collect();
        let mut params = PathParams::new();

        if let [TemplateSegment::Param(name)] = self.segments.as_slice() {
            let last = request.last()?;
            params.insert(name.clone(), (*last).to_string());
            return Some(params);
        }

        if request.len() != self.segments.len() {
            return None;
        }

        for (segment, actual) in self.segments.iter().zip(request) {
            match segment {
                TemplateSegment::Literal(lit) => {
                    if lit != actual {
                        return None;
                    }
                }
                TemplateSegment::Param(name) => {
                    params.insert(name.clone(), actual.to_string());
                }
            }
        }

        Some(params)
    }
}

/// Match `request_path` against `pattern`.
pub fn match_path(request_path: &str, pattern: &str) -> Option<PathParams> {
    PathTemplate::parse(pattern).matches(request_path)
}
