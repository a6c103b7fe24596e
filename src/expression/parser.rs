use std::sync::Arc;

use dashmap::DashMap;
#[cfg(test)]
use mockall::automock;
use tracing::trace;

use super::Descriptor;
use crate::Error;
use crate::Path;
use crate::Result;
use crate::UsageError;
use crate::Value;

/// Turns expression text into a [`Descriptor`].
///
/// Implementations must be pure: the same text always yields an equivalent
/// descriptor and preparing has no side effects.
#[cfg_attr(test, automock)]
pub trait ExpressionParser: Send + Sync {
    fn prepare(
        &self,
        expression: &str,
    ) -> Result<Descriptor>;
}

/// Literals become constants, anything else must be a single property path.
#[derive(Debug, Default, Clone, Copy)]
pub struct PathExpressionParser;

impl ExpressionParser for PathExpressionParser {
    fn prepare(
        &self,
        expression: &str,
    ) -> Result<Descriptor> {
        let text = expression.trim();
        if text.is_empty() {
            return Err(invalid_expression(expression, "empty expression"));
        }

        if let Some(value) = parse_literal(text) {
            return Ok(Descriptor::constant(value));
        }

        let path = Path::parse(text).map_err(|e| match e {
            Error::Usage(UsageError::InvalidPath { reason, .. }) => invalid_expression(expression, &reason),
            other => other,
        })?;
        Ok(Descriptor::path(path))
    }
}

fn invalid_expression(
    expression: &str,
    reason: &str,
) -> Error {
    UsageError::InvalidExpression {
        expression: expression.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

fn parse_literal(text: &str) -> Option<Value> {
    match text {
        "true" => return Some(Value::Bool(true)),
        "false" => return Some(Value::Bool(false)),
        "null" => return Some(Value::Null),
        "undefined" => return Some(Value::Undefined),
        "NaN" => return Some(Value::Number(f64::NAN)),
        _ => {}
    }

    let quoted = text.len() >= 2
        && ((text.starts_with('"') && text.ends_with('"')) || (text.starts_with('\'') && text.ends_with('\'')));
    if quoted {
        return Some(Value::from(&text[1..text.len() - 1]));
    }

    let numeric = text.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '+' || c == '.');
    if numeric {
        return text.parse::<f64>().ok().map(Value::Number);
    }

    None
}

/// Memoizes descriptors per expression text.
///
/// Errors are not cached.
pub struct CachingParser {
    inner: Arc<dyn ExpressionParser>,
    cache: DashMap<String, Descriptor>,
}

impl CachingParser {
    pub fn new(inner: Arc<dyn ExpressionParser>) -> Self {
        Self {
            inner,
            cache: DashMap::new(),
        }
    }

    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }
}

impl ExpressionParser for CachingParser {
    fn prepare(
        &self,
        expression: &str,
    ) -> Result<Descriptor> {
        if let Some(descriptor) = self.cache.get(expression) {
            return Ok(descriptor.clone());
        }

        let descriptor = self.inner.prepare(expression)?;
        self.cache.insert(expression.to_string(), descriptor.clone());
        trace!(expression, "Expression descriptor cached");
        Ok(descriptor)
    }
}
