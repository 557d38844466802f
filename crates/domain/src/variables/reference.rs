//! Placeholder parser for `((variable))` syntax
//!
//! Scans strings for variable references, preserving byte offsets so a
//! later substitution can splice the resolved value into the exact span.

use std::ops::Range;

use thiserror::Error;

/// A parsed `((name))` occurrence in a string field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// The reference name without delimiters. May begin with `/`.
    pub name: String,

    /// Byte range of the full `((name))` token in the original string.
    pub span: Range<usize>,
}

impl Placeholder {
    /// Creates a new placeholder reference.
    #[must_use]
    pub fn new(name: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }

    /// Whether the reference is absolute (leading `/`). Absolute names are
    /// shared across deployments; relative names are namespaced per
    /// deployment.
    #[must_use]
    pub fn is_absolute(&self) -> bool {
        self.name.starts_with('/')
    }
}

/// Malformed placeholder syntax. Surfaced as a configuration error, never
/// silently dropped.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// A `((` with no closing `))` in the same field.
    #[error("unterminated '((' at byte {at}")]
    Unterminated {
        /// Byte offset of the opening delimiter.
        at: usize,
    },

    /// A `((` opened inside another reference. Nesting is not supported.
    #[error("nested '((' at byte {at}")]
    Nested {
        /// Byte offset of the inner opening delimiter.
        at: usize,
    },

    /// `(())` or a whitespace-only name.
    #[error("empty variable name at byte {at}")]
    EmptyName {
        /// Byte offset of the opening delimiter.
        at: usize,
    },
}

/// Parses a string and extracts all `((name))` references, left to right.
///
/// A string without delimiters yields an empty vector. Delimiters must be
/// paired within the field; an unmatched or nested `((` is an error.
///
/// # Examples
///
/// ```
/// use manifold_domain::variables::scan_placeholders;
///
/// let refs = scan_placeholders("secret: ((/var_a)) and ((var_b))").unwrap();
/// assert_eq!(refs.len(), 2);
/// assert_eq!(refs[0].name, "/var_a");
/// assert!(refs[0].is_absolute());
/// assert_eq!(refs[1].name, "var_b");
/// ```
///
/// # Errors
///
/// Returns a [`ScanError`] for unterminated, nested, or empty references.
pub fn scan_placeholders(input: &str) -> Result<Vec<Placeholder>, ScanError> {
    let bytes = input.as_bytes();
    let mut references = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'(' && bytes.get(i + 1) == Some(&b'(') {
            let start = i;
            let mut j = i + 2;

            let end = loop {
                if j >= bytes.len() {
                    return Err(ScanError::Unterminated { at: start });
                }
                if bytes[j] == b'(' && bytes.get(j + 1) == Some(&b'(') {
                    return Err(ScanError::Nested { at: j });
                }
                if bytes[j] == b')' && bytes.get(j + 1) == Some(&b')') {
                    break j;
                }
                j += 1;
            };

            let name = input[start + 2..end].trim();
            if name.is_empty() {
                return Err(ScanError::EmptyName { at: start });
            }

            references.push(Placeholder::new(name, start..end + 2));
            i = end + 2;
        } else {
            i += 1;
        }
    }

    Ok(references)
}
