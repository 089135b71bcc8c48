//! Natural-language intent parsing for vending requests.
//!
//! Converts customer text ("I want 3 cokes", "what do you have?") into a
//! structured [`ParsedIntent`] against the machine's catalog.
//!
//! Two tiers:
//! - **Model-backed** (optional): OpenAI-compatible chat endpoint, active
//!   only when credentials are configured.
//! - **Rule-based** (always available): deterministic keyword and pattern
//!   matching; the guaranteed catch-all.
//!
//! The model tier runs first when present; any of its failures is logged
//! and the call delegates to the rules, so `parse` is infallible.

pub mod model;
pub mod rules;

pub use model::{ModelConfig, ModelParser};
pub use rules::RuleClassifier;

use sv_protocol::intent::ParsedIntent;

/// Two-stage parser: model tier when configured, rule tier as the safety net.
pub struct IntentParser {
    model: Option<ModelParser>,
    rules: RuleClassifier,
}

impl IntentParser {
    pub fn new(model: Option<ModelParser>) -> Self {
        Self {
            model,
            rules: RuleClassifier::new(),
        }
    }

    /// Parser without a model tier. Output is exactly the rule classifier's.
    pub fn rules_only() -> Self {
        Self::new(None)
    }

    /// Resolve the model tier from configuration (absent credentials or a
    /// placeholder key yield a rules-only parser).
    pub fn from_config(config: ModelConfig) -> Self {
        Self::new(ModelParser::from_config(config))
    }

    pub fn has_model_tier(&self) -> bool {
        self.model.is_some()
    }

    /// Parse one message against the catalog. Always produces an intent.
    pub async fn parse(&self, message: &str, catalog: &[String]) -> ParsedIntent {
        if let Some(model) = &self.model {
            match model.parse(message, catalog).await {
                Ok(intent) => {
                    tracing::debug!(
                        tier = "model",
                        intent = ?intent.intent(),
                        confidence = intent.confidence(),
                        "parsed intent"
                    );
                    return intent;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "model parse failed, falling back to rules");
                }
            }
        }

        let intent = self.rules.classify(message, catalog);
        tracing::debug!(
            tier = "rules",
            intent = ?intent.intent(),
            confidence = intent.confidence(),
            "parsed intent"
        );
        intent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sv_protocol::intent::IntentKind;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn catalog() -> Vec<String> {
        ["coke", "pepsi", "sprite"].map(String::from).to_vec()
    }

    fn model_config(server: &MockServer) -> ModelConfig {
        ModelConfig {
            api_key: Some("sk-test".into()),
            base_url: server.uri(),
            model: "gpt-3.5-turbo".into(),
            timeout_secs: 2,
            max_retries: 1,
        }
    }

    #[tokio::test]
    async fn rules_only_matches_classifier_exactly() {
        let parser = IntentParser::rules_only();
        let rules = RuleClassifier::new();

        for message in [
            "I want to buy 3 cokes",
            "what do you have?",
            "cancel",
            "gibberish",
            "",
        ] {
            let via_parser = parser.parse(message, &catalog()).await;
            let via_rules = rules.classify(message, &catalog());
            assert_eq!(via_parser, via_rules, "message: {message}");
        }
    }

    #[tokio::test]
    async fn unconfigured_model_yields_rules_only() {
        let parser = IntentParser::from_config(ModelConfig::default());
        assert!(!parser.has_model_tier());

        let intent = parser.parse("buy 2 sprites", &catalog()).await;
        assert_eq!(intent.intent(), IntentKind::Purchase);
        assert_eq!(intent.product_name(), Some("sprite"));
    }

    #[tokio::test]
    async fn model_success_is_returned_unmodified() {
        let server = MockServer::start().await;
        let content = r#"{"intent": "purchase", "product_name": "pepsi", "quantity": 2, "confidence": 0.92, "reasoning": "two pepsis requested"}"#;
        let body = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        });
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let parser = IntentParser::from_config(model_config(&server));
        assert!(parser.has_model_tier());

        let intent = parser.parse("two pepsis please", &catalog()).await;
        assert_eq!(intent.intent(), IntentKind::Purchase);
        assert_eq!(intent.product_name(), Some("pepsi"));
        assert_eq!(intent.confidence(), 0.92);
        assert_eq!(intent.reasoning(), "two pepsis requested");
    }

    #[tokio::test]
    async fn model_failure_falls_back_to_rules() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let parser = IntentParser::from_config(model_config(&server));
        let expected = RuleClassifier::new().classify("I want to buy 3 cokes", &catalog());

        let intent = parser.parse("I want to buy 3 cokes", &catalog()).await;
        assert_eq!(intent, expected);
    }

    #[tokio::test]
    async fn malformed_model_output_falls_back_to_rules() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "oops"}}]
        });
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let parser = IntentParser::from_config(model_config(&server));
        let expected = RuleClassifier::new().classify("cancel my order", &catalog());

        let intent = parser.parse("cancel my order", &catalog()).await;
        assert_eq!(intent, expected);
        assert_eq!(intent.intent(), IntentKind::Cancel);
    }
}
