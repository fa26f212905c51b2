//! File name matching.

use glob::{MatchOptions, Pattern};
use photoferry_core::FilterOptions;
use photoferry_error::{ConfigError, PhotoferryResult};
use regex::{Regex, RegexBuilder};
use std::path::Path;

#[derive(Debug, Clone)]
enum Matcher {
    Glob {
        pattern: Pattern,
        options: MatchOptions,
    },
    Regex(Regex),
}

/// Decides whether a file name is a candidate.
///
/// Glob expressions without wildcards match anywhere in the name, so
/// `copy` behaves like `*copy*`. Regular expressions are searched, not
/// anchored.
///
/// # Examples
///
/// ```
/// use photoferry_core::FilterOptions;
/// use photoferry_select::NameFilter;
/// use std::path::Path;
///
/// let options = FilterOptions::builder()
///     .expression("copy")
///     .ignore_case(true)
///     .build()
///     .unwrap();
/// let filter = NameFilter::new(&options).unwrap();
/// assert!(!filter.accepts(Path::new("/photos/Copy_of_img.png")));
/// assert!(filter.accepts(Path::new("/photos/img.png")));
/// ```
#[derive(Debug, Clone)]
pub struct NameFilter {
    matcher: Option<Matcher>,
    exclude: bool,
}

impl NameFilter {
    /// Compile the expression in `options`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid glob or regex syntax.
    pub fn new(options: &FilterOptions) -> PhotoferryResult<Self> {
        let matcher = match options.expression().as_deref().filter(|e| !e.is_empty()) {
            None => None,
            Some(expression) if *options.regex() => {
                let regex = RegexBuilder::new(expression)
                    .case_insensitive(*options.ignore_case())
                    .build()
                    .map_err(|e| {
                        ConfigError::new(format!("Invalid filter regex '{}': {}", expression, e))
                    })?;
                Some(Matcher::Regex(regex))
            }
            Some(expression) => {
                let source = if expression.contains(['*', '?', '[']) {
                    expression.to_string()
                } else {
                    format!("*{}*", Pattern::escape(expression))
                };
                let pattern = Pattern::new(&source).map_err(|e| {
                    ConfigError::new(format!("Invalid filter glob '{}': {}", expression, e))
                })?;
                Some(Matcher::Glob {
                    pattern,
                    options: MatchOptions {
                        case_sensitive: !*options.ignore_case(),
                        require_literal_separator: false,
                        require_literal_leading_dot: false,
                    },
                })
            }
        };
        Ok(Self {
            matcher,
            exclude: *options.exclude(),
        })
    }

    /// A filter that accepts everything.
    pub fn accept_all() -> Self {
        Self {
            matcher: None,
            exclude: true,
        }
    }

    /// True if the expression matches `name`.
    ///
    /// Always false when there is no expression.
    pub fn matches(&self, name: &str) -> bool {
        match &self.matcher {
            None => false,
            Some(Matcher::Glob { pattern, options }) => pattern.matches_with(name, *options),
            Some(Matcher::Regex(regex)) => regex.is_match(name),
        }
    }

    /// True if the file at `path` should be selected.
    pub fn accepts(&self, path: &Path) -> bool {
        if self.matcher.is_none() {
            return true;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        self.matches(&name) != self.exclude
    }
}
