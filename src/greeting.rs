//! Greeting text from an external text-generation service.
//!
//! The service is opaque to the sculpture: anything implementing
//! [`GreetingSource`] can supply the line shown above the controls. Failures
//! never propagate; [`resolve_greeting`] substitutes a fixed line instead.

use crate::error::GreetingError;
use tracing::{debug, warn};

/// Prompt sent to the text-generation service.
pub const GREETING_PROMPT: &str = "Poetic 1-sentence welcome for a customizable particle app. Max 10 words.";

/// Shown until a greeting has been resolved.
pub const PLACEHOLDER_GREETING: &str = "Initializing system...";

/// Used whenever the service fails or answers with nothing.
pub const FALLBACK_GREETING: &str = "Shape the stars with your will.";

/// A producer of greeting text.
pub trait GreetingSource {
    fn generate(&self, prompt: &str) -> Result<String, GreetingError>;
}

/// A source that always answers with the same line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticGreeting(pub String);

impl GreetingSource for StaticGreeting {
    fn generate(&self, _prompt: &str) -> Result<String, GreetingError> {
        Ok(self.0.clone())
    }
}

/// A source for when no service is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGreetingService;

impl GreetingSource for NoGreetingService {
    fn generate(&self, _prompt: &str) -> Result<String, GreetingError> {
        Err(GreetingError::Unavailable("no greeting service configured".into()))
    }
}

/// Ask `source` for a greeting, falling back to [`FALLBACK_GREETING`].
pub fn resolve_greeting(source: &dyn GreetingSource) -> String {
    let answer = source.generate(GREETING_PROMPT).and_then(|text| {
        let text = text.trim();
        if text.is_empty() {
            Err(GreetingError::Empty)
        } else {
            Ok(text.to_string())
        }
    });

    match answer {
        Ok(text) => {
            debug!(greeting = %text, "greeting resolved");
            text
        }
        Err(e) => {
            warn!(error = %e, "using fallback greeting");
            FALLBACK_GREETING.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct RecordingSource {
        prompts: RefCell<Vec<String>>,
        answer: Result<String, GreetingError>,
    }

    impl GreetingSource for RecordingSource {
        fn generate(&self, prompt: &str) -> Result<String, GreetingError> {
            self.prompts.borrow_mut().push(prompt.to_string());
            self.answer.clone()
        }
    }

    #[test]
    fn test_successful_greeting_is_trimmed() {
        let source = RecordingSource {
            prompts: RefCell::new(Vec::new()),
            answer: Ok("  Light bends to your hands.\n".into()),
        };
        assert_eq!(resolve_greeting(&source), "Light bends to your hands.");
        assert_eq!(*source.prompts.borrow(), vec![GREETING_PROMPT.to_string()]);
    }

    #[test]
    fn test_failure_uses_fallback() {
        assert_eq!(resolve_greeting(&NoGreetingService), FALLBACK_GREETING);
    }

    #[test]
    fn test_empty_answer_uses_fallback() {
        let source = StaticGreeting("   ".into());
        assert_eq!(resolve_greeting(&source), FALLBACK_GREETING);
    }
}
