//! `${VAR}` expansion for configuration files.

use std::collections::HashMap;
use std::iter::Peekable;
use std::str::Chars;

use crate::error::{DbError, DbResult};

const TARGET: &str = "config";

/// Where variable values come from.
pub trait EnvSource: Send + Sync {
    /// Look up a variable.
    fn get(&self, name: &str) -> Option<String>;
}

/// Reads the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// In-memory variables, mostly for tests.
#[derive(Debug, Clone, Default)]
pub struct MapEnvSource {
    vars: HashMap<String, String>,
}

impl MapEnvSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl EnvSource for MapEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Expands variable references in configuration text.
///
/// Supported syntax:
/// - `${VAR}` - required variable
/// - `${VAR:-default}` - fallback when unset or empty
/// - `${VAR:?message}` - required, failing with `message`
/// - `$VAR` - bare reference
///
/// A `$` not followed by `{` or an identifier is kept literally, so
/// passwords containing `$` survive unless they look like a reference.
#[derive(Debug, Clone, Default)]
pub struct EnvExpander<S: EnvSource = StdEnvSource> {
    source: S,
}

impl EnvExpander<StdEnvSource> {
    /// Expander over the process environment.
    pub fn new() -> Self {
        Self {
            source: StdEnvSource,
        }
    }
}

impl<S: EnvSource> EnvExpander<S> {
    /// Expander over a custom source.
    pub fn with_source(source: S) -> Self {
        Self { source }
    }

    /// Expand every reference in `input`.
    pub fn expand(&self, input: &str) -> DbResult<String> {
        let mut out = String::with_capacity(input.len());
        let mut chars = input.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' {
                out.push(c);
                continue;
            }
            match chars.peek() {
                Some('{') => {
                    chars.next();
                    out.push_str(&self.expand_braced(&mut chars)?);
                }
                Some(n) if n.is_alphabetic() || *n == '_' => {
                    out.push_str(&self.expand_bare(&mut chars)?);
                }
                _ => out.push(c),
            }
        }

        Ok(out)
    }

    fn expand_braced(&self, chars: &mut Peekable<Chars<'_>>) -> DbResult<String> {
        let mut name = String::new();
        let mut modifier: Option<char> = None;
        let mut argument = String::new();
        let mut closed = false;

        for c in chars.by_ref() {
            match c {
                '}' => {
                    closed = true;
                    break;
                }
                ':' if modifier.is_none() && argument.is_empty() => modifier = Some(':'),
                c if modifier == Some(':') => modifier = Some(c),
                c if modifier.is_some() => argument.push(c),
                c => name.push(c),
            }
        }

        if !closed {
            return Err(DbError::config(TARGET, "unterminated `${` reference"));
        }
        if name.is_empty() {
            return Err(DbError::config(TARGET, "empty variable name"));
        }

        match self.source.get(&name) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => match modifier {
                Some('-') => Ok(argument),
                Some('?') if !argument.is_empty() => {
                    Err(DbError::config(TARGET, format!("{name}: {argument}")))
                }
                _ => Err(DbError::config(
                    TARGET,
                    format!("environment variable `{name}` is not set"),
                )),
            },
        }
    }

    fn expand_bare(&self, chars: &mut Peekable<Chars<'_>>) -> DbResult<String> {
        let mut name = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                name.push(c);
                chars.next();
            } else {
                break;
            }
        }

        self.source.get(&name).ok_or_else(|| {
            DbError::config(TARGET, format!("environment variable `{name}` is not set"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expander() -> EnvExpander<MapEnvSource> {
        EnvExpander::with_source(
            MapEnvSource::new()
                .set("HOST", "10.0.0.4")
                .set("PORT", "27017")
                .set("MONGO_PASSWORD", "s3cret")
                .set("EMPTY", ""),
        )
    }

    #[test]
    fn test_expand_braced() {
        assert_eq!(
            expander().expand("host = \"${HOST}\"\nport = ${PORT}").unwrap(),
            "host = \"10.0.0.4\"\nport = 27017"
        );
    }

    #[test]
    fn test_expand_bare() {
        assert_eq!(
            expander().expand("password = \"$MONGO_PASSWORD\"").unwrap(),
            "password = \"s3cret\""
        );
    }

    #[test]
    fn test_default_value() {
        assert_eq!(expander().expand("${MISSING:-admin}").unwrap(), "admin");
        assert_eq!(expander().expand("${EMPTY:-admin}").unwrap(), "admin");
        assert_eq!(expander().expand("${HOST:-localhost}").unwrap(), "10.0.0.4");
    }

    #[test]
    fn test_required_message() {
        let err = expander().expand("${MISSING:?set the mongo password}").unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("set the mongo password"));
    }

    #[test]
    fn test_missing_variable() {
        let err = expander().expand("${MISSING}").unwrap_err();
        assert!(err.to_string().contains("MISSING"));
        assert!(expander().expand("$MISSING").is_err());
    }

    #[test]
    fn test_literal_dollar() {
        assert_eq!(expander().expand("cost $5").unwrap(), "cost $5");
        assert_eq!(expander().expand("trailing $").unwrap(), "trailing $");
    }

    #[test]
    fn test_unterminated() {
        assert!(expander().expand("${HOST").is_err());
        assert!(expander().expand("${}").is_err());
    }
}
