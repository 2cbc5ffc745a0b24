//! Edge routing predicates
//!
//! A condition is a boolean minijinja expression evaluated against the
//! message payload, bound as `message`:
//!
//! ```ignore
//! let cond = EdgeCondition::named("is_even", "message is even");
//! assert!(cond.evaluate(&serde_json::json!(4))?);
//! ```

use std::fmt;

/// Routing predicate attached to a direct edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeCondition {
    name: Option<String>,
    expression: String,
}

impl EdgeCondition {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            name: None,
            expression: expression.into(),
        }
    }

    pub fn named(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            expression: expression.into(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Evaluate against a payload. An empty expression always passes.
    pub fn evaluate(&self, payload: &serde_json::Value) -> Result<bool, minijinja::Error> {
        let expr = self.expression.trim();
        if expr.is_empty() {
            return Ok(true);
        }

        let env = minijinja::Environment::new();
        let expression = env.compile_expression(expr)?;
        let value = expression.eval(minijinja::context! { message => payload })?;

        Ok(value.is_true())
    }
}

impl fmt::Display for EdgeCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name {
            Some(ref name) => f.write_str(name),
            None => f.write_str(&self.expression),
        }
    }
}
