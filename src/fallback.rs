/// Decides what a lookup returns when no translation could be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackPolicy {
    base_string_as_fallback: bool,
}

impl FallbackPolicy {
    /// Combine the instance default with an optional per-call override.
    pub fn effective(instance_default: bool, per_call: Option<bool>) -> Self {
        Self {
            base_string_as_fallback: per_call.unwrap_or(instance_default),
        }
    }

    /// `None` is a valid "no translation" result, not a failure.
    pub fn decide(&self, original: &str) -> Option<String> {
        self.base_string_as_fallback.then(|| original.to_string())
    }
}
