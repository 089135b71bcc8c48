//! Purchase-intent data model shared by both parsing tiers.
//!
//! A `ParsedIntent` is produced fresh on every parse call and handed to the
//! response layer; it has no persistence and no identity beyond one exchange.
//! Field invariants (confidence range, quantity positivity, non-empty
//! reasoning) are enforced at construction, so any value that survives to a
//! caller is well-formed.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The high-level action a customer utterance expresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    /// Customer wants to buy something.
    Purchase,
    /// Customer is asking about products or stock.
    Query,
    /// Customer wants to cancel a transaction.
    Cancel,
    /// Customer explicitly declines to buy.
    Refuse,
    /// Intent is unclear.
    Unknown,
}

/// Invariant violations raised when building a `ParsedIntent`.
#[derive(Debug, Error, PartialEq)]
pub enum IntentError {
    #[error("confidence {0} is outside [0.0, 1.0]")]
    ConfidenceOutOfRange(f64),

    #[error("quantity must be positive, got {0}")]
    NonPositiveQuantity(i64),

    #[error("reasoning must not be empty")]
    EmptyReasoning,

    #[error("product '{0}' is not in the catalog")]
    UnknownProduct(String),
}

/// A structured purchase intent extracted from one customer message.
///
/// Fields are private; construction goes through [`ParsedIntent::new`] or the
/// fixed-confidence constructors used by the rule classifier. Wire data
/// deserializes through [`RawIntent`], so a malformed model response is a
/// typed [`IntentError`] rather than a panic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawIntent")]
pub struct ParsedIntent {
    intent: IntentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    quantity: Option<NonZeroU32>,
    confidence: f64,
    reasoning: String,
}

impl ParsedIntent {
    /// Build an intent, validating every field invariant.
    pub fn new(
        intent: IntentKind,
        product_name: Option<String>,
        quantity: Option<NonZeroU32>,
        confidence: f64,
        reasoning: impl Into<String>,
    ) -> Result<Self, IntentError> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(IntentError::ConfidenceOutOfRange(confidence));
        }
        let reasoning = reasoning.into();
        if reasoning.trim().is_empty() {
            return Err(IntentError::EmptyReasoning);
        }
        Ok(Self {
            intent,
            product_name,
            quantity,
            confidence,
            reasoning,
        })
    }

    /// Negative phrasing combined with purchase keywords.
    pub fn refusal(reasoning: impl Into<String>) -> Self {
        Self::fixed(IntentKind::Refuse, 0.9, reasoning)
    }

    /// Explicit cancel/stop keywords.
    pub fn cancellation(reasoning: impl Into<String>) -> Self {
        Self::fixed(IntentKind::Cancel, 0.8, reasoning)
    }

    /// Inventory or product question.
    pub fn query(reasoning: impl Into<String>) -> Self {
        Self::fixed(IntentKind::Query, 0.85, reasoning)
    }

    /// Catch-all when no signal matched.
    pub fn unknown(reasoning: impl Into<String>) -> Self {
        Self::fixed(IntentKind::Unknown, 0.5, reasoning)
    }

    /// Purchase with an extracted product and quantity. Confidence is 0.7
    /// when a product was matched against the catalog, 0.3 otherwise.
    pub fn purchase(
        product_name: Option<String>,
        quantity: NonZeroU32,
        reasoning: impl Into<String>,
    ) -> Self {
        let confidence = if product_name.is_some() { 0.7 } else { 0.3 };
        let reasoning = reasoning.into();
        debug_assert!(!reasoning.trim().is_empty());
        Self {
            intent: IntentKind::Purchase,
            product_name,
            quantity: Some(quantity),
            confidence,
            reasoning,
        }
    }

    /// Constructor for the rule classifier's fixed confidence bands. The
    /// constants are in range, so this cannot fail.
    fn fixed(intent: IntentKind, confidence: f64, reasoning: impl Into<String>) -> Self {
        let reasoning = reasoning.into();
        debug_assert!(!reasoning.trim().is_empty());
        Self {
            intent,
            product_name: None,
            quantity: None,
            confidence,
            reasoning,
        }
    }

    pub fn intent(&self) -> IntentKind {
        self.intent
    }

    /// Product name, verbatim from the catalog the caller supplied.
    pub fn product_name(&self) -> Option<&str> {
        self.product_name.as_deref()
    }

    pub fn quantity(&self) -> Option<NonZeroU32> {
        self.quantity
    }

    /// Self-reported certainty in [0.0, 1.0].
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Human-readable justification. Observability only, never control flow.
    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }
}

/// Unvalidated wire shape of an intent, as a model endpoint returns it.
#[derive(Debug, Deserialize)]
pub struct RawIntent {
    pub intent: IntentKind,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: String,
}

impl TryFrom<RawIntent> for ParsedIntent {
    type Error = IntentError;

    fn try_from(raw: RawIntent) -> Result<Self, IntentError> {
        let quantity = match raw.quantity {
            None => None,
            Some(n) => Some(
                u32::try_from(n)
                    .ok()
                    .and_then(NonZeroU32::new)
                    .ok_or(IntentError::NonPositiveQuantity(n))?,
            ),
        };
        Self::new(
            raw.intent,
            raw.product_name,
            quantity,
            raw.confidence,
            raw.reasoning,
        )
    }
}
