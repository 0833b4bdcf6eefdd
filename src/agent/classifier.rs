//! Intent classification
//!
//! Maps a request to one registered intent label plus extracted entities.
//! The model-backed classifier never fails on malformed output: anything it
//! cannot parse becomes the fallback intent with zero confidence.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::agent::prompts;
use crate::agent::strategy::stringify;
use crate::core::{Entities, IntentClassification, ParleyError, Result};
use crate::llm::{GenerateOptions, TextGenerator};

/// Label used when nothing else applies
pub const OUT_OF_SCOPE: &str = "out_of_scope";

/// Classifies requests into intent labels
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    /// Classify a single request. One attempt, no retries.
    async fn classify(&self, request: &str) -> Result<IntentClassification>;

    /// Make `label` a valid classification target
    fn register_intent(&mut self, _label: &str, _description: &str) -> Result<()> {
        Ok(())
    }

    fn unregister_intent(&mut self, _label: &str) {}
}

/// Canonical form of an intent label: trimmed and lowercase
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Outcome of parsing a classifier reply
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedIntent {
    Parsed(IntentClassification),
    Unparseable { reason: String },
}

impl ParsedIntent {
    /// Parse the structured reply of the model
    pub fn from_reply(reply: &str) -> Self {
        let Some(json) = prompts::extract_json_object(reply) else {
            return Self::unparseable("no JSON object in reply");
        };

        let value: Value = match serde_json::from_str(&json) {
            Ok(value) => value,
            Err(e) => return Self::unparseable(format!("invalid JSON: {}", e)),
        };

        let intent = match value.get("intent").and_then(Value::as_str).map(str::trim) {
            Some(intent) if !intent.is_empty() => normalize_label(intent),
            _ => return Self::unparseable("missing intent"),
        };

        let confidence = match value.get("confidence") {
            None | Some(Value::Null) => 0.5,
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0) as f32,
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
            Some(_) => 0.0,
        };

        let entities: Entities = match value.get("entities") {
            Some(Value::Object(map)) => map
                .iter()
                .filter_map(|(k, v)| stringify(v).map(|s| (k.clone(), s)))
                .collect(),
            _ => Entities::new(),
        };

        let reasoning = value
            .get("reasoning")
            .and_then(Value::as_str)
            .unwrap_or_default();

        Self::Parsed(IntentClassification::new(intent, entities, confidence).with_reasoning(reasoning))
    }

    fn unparseable(reason: impl Into<String>) -> Self {
        Self::Unparseable {
            reason: reason.into(),
        }
    }

    /// Resolve to a usable classification
    pub fn into_classification(self, fallback_label: &str) -> IntentClassification {
        match self {
            Self::Parsed(classification) => classification,
            Self::Unparseable { reason } => {
                let err = ParleyError::UnclassifiableIntent(reason);
                tracing::warn!("{}; using '{}'", err, fallback_label);
                IntentClassification::fallback(fallback_label, err.to_string())
            }
        }
    }
}

/// Classifier that asks the model for a JSON classification
pub struct LlmIntentClassifier {
    generator: Arc<dyn TextGenerator>,
    /// (label, description) in registration order
    intents: Vec<(String, String)>,
    fallback_label: String,
    options: GenerateOptions,
}

impl LlmIntentClassifier {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            intents: Vec::new(),
            fallback_label: OUT_OF_SCOPE.to_string(),
            options: GenerateOptions::new(150, 0.0).with_stop(Vec::new()),
        }
    }

    /// Label returned for unparseable replies
    pub fn with_fallback_label(mut self, label: &str) -> Self {
        self.fallback_label = normalize_label(label);
        self
    }

    pub fn intents(&self) -> &[(String, String)] {
        &self.intents
    }

    fn prompt(&self, request: &str) -> String {
        if self.intents.is_empty() {
            tracing::warn!("No intents registered; classification may be unreliable");
            let default = vec![(
                self.fallback_label.clone(),
                "Default intent when no agents are registered".to_string(),
            )];
            return prompts::classification_prompt(&default, request);
        }
        prompts::classification_prompt(&self.intents, request)
    }
}

#[async_trait]
impl IntentClassifier for LlmIntentClassifier {
    async fn classify(&self, request: &str) -> Result<IntentClassification> {
        let reply = self
            .generator
            .generate(&self.prompt(request), &self.options)
            .await?;
        tracing::debug!(%reply, "Classifier reply");

        let classification = ParsedIntent::from_reply(&reply).into_classification(&self.fallback_label);
        tracing::info!(
            intent = %classification.intent,
            confidence = classification.confidence,
            "Classified request"
        );
        Ok(classification)
    }

    fn register_intent(&mut self, label: &str, description: &str) -> Result<()> {
        let label = normalize_label(label);
        if label.is_empty() {
            return Err(ParleyError::config("intent label cannot be empty"));
        }

        let description = match description.trim() {
            "" => "No description provided.".to_string(),
            d => d.to_string(),
        };

        match self.intents.iter_mut().find(|(l, _)| *l == label) {
            Some(entry) => entry.1 = description,
            None => self.intents.push((label.clone(), description)),
        }
        tracing::debug!(%label, "Registered intent");
        Ok(())
    }

    fn unregister_intent(&mut self, label: &str) {
        let label = normalize_label(label);
        self.intents.retain(|(l, _)| *l != label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedGenerator;

    #[test]
    fn test_parse_full_reply() {
        let parsed = ParsedIntent::from_reply(
            r#"{"intent": "Calculate", "confidence": 0.98, "entities": {"expression": "5 + 3", "n": 2}, "reasoning": "math"}"#,
        );
        let ParsedIntent::Parsed(c) = parsed else {
            panic!("expected parsed intent");
        };
        assert_eq!(c.intent, "calculate");
        assert!((c.confidence - 0.98).abs() < 1e-6);
        assert_eq!(c.entities["expression"], "5 + 3");
        assert_eq!(c.entities["n"], "2");
        assert_eq!(c.reasoning, "math");
    }

    #[test]
    fn test_parse_defaults_and_clamping() {
        let ParsedIntent::Parsed(c) = ParsedIntent::from_reply(r#"{"intent": "greeting"}"#) else {
            panic!("expected parsed intent");
        };
        assert_eq!(c.confidence, 0.5);
        assert!(c.entities.is_empty());

        let ParsedIntent::Parsed(c) =
            ParsedIntent::from_reply(r#"{"intent": "greeting", "confidence": "7"}"#)
        else {
            panic!("expected parsed intent");
        };
        assert_eq!(c.confidence, 1.0);
    }

    #[test]
    fn test_malformed_reply_falls_back() {
        for reply in ["I think it's a greeting", "{\"intent\": 3}", "{\"confidence\": 0.9}", "{"] {
            let parsed = ParsedIntent::from_reply(reply);
            assert!(matches!(parsed, ParsedIntent::Unparseable { .. }), "{reply}");
            let c = parsed.into_classification(OUT_OF_SCOPE);
            assert_eq!(c.intent, OUT_OF_SCOPE);
            assert_eq!(c.confidence, 0.0);
        }
    }

    #[tokio::test]
    async fn test_classifier_prompt_lists_registered_intents() {
        let generator = Arc::new(ScriptedGenerator::new().reply(
            "```json\n{\"intent\": \"greeting\", \"confidence\": 0.9, \"entities\": {}}\n```",
        ));
        let mut classifier = LlmIntentClassifier::new(generator.clone());
        classifier.register_intent("greeting", "Hellos").unwrap();
        classifier.register_intent("calculate", "").unwrap();
        classifier.register_intent("greeting", "Greetings and small talk").unwrap();

        let c = classifier.classify("hello").await.unwrap();
        assert_eq!(c.intent, "greeting");

        let prompt = &generator.prompts()[0];
        assert!(prompt.contains("- greeting: Greetings and small talk"));
        assert!(prompt.contains("- calculate: No description provided."));
        assert_eq!(classifier.intents().len(), 2);
    }

    #[tokio::test]
    async fn test_generation_failure_is_returned() {
        let generator = Arc::new(ScriptedGenerator::new().fail("model not loaded"));
        let classifier = LlmIntentClassifier::new(generator);
        assert!(classifier.classify("hi").await.unwrap_err().is_generation_failure());
    }

    #[test]
    fn test_register_rejects_empty_label() {
        let mut classifier = LlmIntentClassifier::new(Arc::new(ScriptedGenerator::new()));
        assert!(classifier.register_intent("  ", "x").is_err());
        classifier.register_intent("a", "x").unwrap();
        classifier.unregister_intent("a");
        assert!(classifier.intents().is_empty());
    }

    #[test]
    fn test_labels_are_normalized() {
        let mut classifier = LlmIntentClassifier::new(Arc::new(ScriptedGenerator::new()));
        classifier.register_intent(" Lookup ", "facts").unwrap();
        classifier.register_intent("LOOKUP", "weather and facts").unwrap();
        assert_eq!(
            classifier.intents(),
            [("lookup".to_string(), "weather and facts".to_string())]
        );
        classifier.unregister_intent("Lookup");
        assert!(classifier.intents().is_empty());
    }
}
