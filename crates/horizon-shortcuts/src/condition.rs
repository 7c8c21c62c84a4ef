//! Conditions and the context they are evaluated against.
//!
//! The engine does not parse condition expressions. A [`Condition`] carries
//! its source text and, optionally, a representation parsed by the host;
//! both are handed to a [`ConditionEvaluator`] together with the current
//! [`Context`].

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// An activation condition.
///
/// Empty text means "always active".
#[derive(Clone, Default)]
pub struct Condition {
    text: String,
    parsed: Option<Arc<dyn Any + Send + Sync>>,
}

impl Condition {
    /// Create a condition from its source text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parsed: None,
        }
    }

    /// Attach a host-specific parsed representation.
    pub fn with_parsed<T: Any + Send + Sync>(mut self, parsed: T) -> Self {
        self.parsed = Some(Arc::new(parsed));
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the condition has no text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Downcast the parsed representation.
    pub fn parsed<T: Any>(&self) -> Option<&T> {
        self.parsed.as_deref().and_then(|parsed| parsed.downcast_ref())
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition")
            .field("text", &self.text)
            .field("parsed", &self.parsed.is_some())
            .finish()
    }
}

impl From<&str> for Condition {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// The value bag conditions are evaluated against.
#[derive(Clone, Debug, PartialEq)]
pub struct Context(Value);

impl Default for Context {
    fn default() -> Self {
        Self(Value::Object(Default::default()))
    }
}

impl Context {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Look up a dotted path such as `"editor.focused"`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(&self.0, |value, segment| value.get(segment))
    }
}

impl From<Value> for Context {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Evaluates conditions for the manager.
pub trait ConditionEvaluator: Send + Sync {
    /// Whether the condition holds in the context.
    fn eval(&self, condition: &Condition, context: &Context) -> bool;

    /// Whether two conditions are equivalent, for duplicate detection.
    fn equals(&self, a: &Condition, b: &Condition) -> bool {
        a.text().trim() == b.text().trim()
    }
}

/// Evaluates conditions as a single context flag.
///
/// The text is a dotted path into the context, optionally prefixed with `!`
/// to negate it. Empty text is always true; a missing path is false.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlagEvaluator;

impl ConditionEvaluator for FlagEvaluator {
    fn eval(&self, condition: &Condition, context: &Context) -> bool {
        let text = condition.text().trim();
        if text.is_empty() {
            return true;
        }
        let (negated, path) = match text.strip_prefix('!') {
            Some(rest) => (true, rest.trim()),
            None => (false, text),
        };
        let truthy = context.get(path).is_some_and(is_truthy);
        truthy != negated
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_context_dotted_lookup() {
        let context = Context::new(json!({ "editor": { "focused": true } }));
        assert_eq!(context.get("editor.focused"), Some(&json!(true)));
        assert_eq!(context.get("editor.missing"), None);
    }

    #[test]
    fn test_flag_evaluator() {
        let context = Context::new(json!({ "editor": { "focused": true }, "count": 0 }));
        let eval = FlagEvaluator;
        assert!(eval.eval(&Condition::default(), &context));
        assert!(eval.eval(&"editor.focused".into(), &context));
        assert!(!eval.eval(&"!editor.focused".into(), &context));
        assert!(!eval.eval(&"count".into(), &context));
        assert!(eval.eval(&"! missing".into(), &context));
    }

    #[test]
    fn test_condition_equality_ignores_whitespace() {
        assert!(FlagEvaluator.equals(&" a ".into(), &"a".into()));
        assert!(!FlagEvaluator.equals(&"a".into(), &"b".into()));
    }

    #[test]
    fn test_parsed_downcast() {
        let condition = Condition::new("x").with_parsed(7_u32);
        assert_eq!(condition.parsed::<u32>(), Some(&7));
        assert_eq!(condition.parsed::<i64>(), None);
    }
}
