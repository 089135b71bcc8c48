//! Rule-based intent classifier — the deterministic fallback tier.
//!
//! Classifies one customer message against the catalog using keyword
//! families and pattern extraction. Pure and synchronous: no I/O, no state,
//! safe to call concurrently. Never fails to produce an intent — anything
//! it cannot place lands in the `Unknown` catch-all, so this tier is the
//! guaranteed last resort when the model tier is absent or misbehaves.

use std::num::NonZeroU32;
use std::sync::LazyLock;

use regex::Regex;

use sv_protocol::intent::ParsedIntent;

// ── Signal keyword families (word-boundary, case handled by lowercasing) ──

static RE_NEGATIVE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\b(?:dont|don't|not|no|never|refuse|decline|cancel|stop)\b",
        r"\b(?:dont|don't)\s+(?:want|need|buy|purchase)\b",
        r"\b(?:not|no)\s+(?:thanks|thank you|interested)\b",
    ])
});

static RE_PURCHASE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\b(?:buy|purchase|get|want|need)\b",
        r"\b(?:give me|i'll take|i want)\b",
        r"\b(?:can i have|may i have)\b",
    ])
});

static RE_QUERY: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\b(?:what|which|how many|show me|list|available)\b",
        r"\b(?:do you have|what's available)\b",
        r"\b(?:inventory|stock|products)\b",
    ])
});

static RE_CANCEL: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\b(?:cancel|stop|abort|undo)\b",
        r"\b(?:never mind|forget it)\b",
    ])
});

// ── Quantity extraction, in priority order ──────────────────────────────

/// Digits immediately before a unit or brand token ("3 cokes", "2 cans").
static RE_QTY_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(\d+)\s*(?:cans?|bottles?|sodas?|cokes?|pepsis?|sprites?|fantas?|mountain\s*dews?|dr\s*peppers?)",
    )
    .unwrap()
});

/// Digits immediately after an acquisition verb ("buy 2", "want 4").
static RE_QTY_VERB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:buy|get|want|need)\s+(\d+)").unwrap());

/// Digits immediately before a bare brand token ("2 coke").
static RE_QTY_BRAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s+(?:coke|pepsi|sprite|fanta|mountain\s*dew|dr\s*pepper)").unwrap()
});

/// Indefinite article or "one" before a brand token ("a coke", "one sprite").
static RE_QTY_ARTICLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:a|an|one)\s+(?:coke|pepsi|sprite|fanta|mountain\s*dew|dr\s*pepper)").unwrap()
});

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
}

/// Pattern-matching classifier over customer messages.
pub struct RuleClassifier;

impl RuleClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify one message against the catalog. Always yields an intent.
    pub fn classify(&self, message: &str, catalog: &[String]) -> ParsedIntent {
        classify_message(message, catalog)
    }
}

impl Default for RuleClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Core decision logic. Signals are computed independently, then resolved
/// in priority order: refuse, cancel, query, purchase, unknown.
fn classify_message(message: &str, catalog: &[String]) -> ParsedIntent {
    let lower = message.to_lowercase();
    let text = lower.trim();

    let negative = matches_any(&RE_NEGATIVE, text);
    let purchase = matches_any(&RE_PURCHASE, text);
    let query = matches_any(&RE_QUERY, text);
    let cancel = matches_any(&RE_CANCEL, text);

    if negative && purchase {
        return ParsedIntent::refusal("negative phrasing alongside purchase keywords");
    }

    if cancel {
        return ParsedIntent::cancellation("explicit cancel/stop keyword");
    }

    if query {
        return ParsedIntent::query("asked about inventory or products");
    }

    if purchase {
        let product = extract_product(text, catalog);
        let quantity = extract_quantity(text);
        let reasoning = match &product {
            Some(name) => format!("purchase keywords; matched '{name}', quantity {quantity}"),
            None => format!("purchase keywords but no catalog product matched, quantity {quantity}"),
        };
        return ParsedIntent::purchase(product, quantity, reasoning);
    }

    ParsedIntent::unknown("no purchase, query, or cancel keywords")
}

fn matches_any(patterns: &[Regex], text: &str) -> bool {
    patterns.iter().any(|re| re.is_match(text))
}

/// First catalog entry (caller order) appearing as a substring of the
/// message. Substring containment, not token matching: a catalog name
/// embedded in a longer word will match.
fn extract_product(text: &str, catalog: &[String]) -> Option<String> {
    catalog.iter().find(|p| text.contains(p.as_str())).cloned()
}

/// Extract a purchase quantity. First pattern that captures a positive
/// integer wins; a captured zero fails that pattern rather than producing
/// an invalid quantity. With no numeric evidence the quantity defaults to
/// one — "buy coke" and "buy 1 coke" are deliberately indistinguishable.
fn extract_quantity(text: &str) -> NonZeroU32 {
    for re in [&*RE_QTY_UNIT, &*RE_QTY_VERB, &*RE_QTY_BRAND] {
        if let Some(caps) = re.captures(text)
            && let Ok(n) = caps[1].parse::<u32>()
            && let Some(n) = NonZeroU32::new(n)
        {
            return n;
        }
    }

    // "a coke" / "one sprite" — explicitly a single can.
    if RE_QTY_ARTICLE.is_match(text) {
        return NonZeroU32::MIN;
    }

    NonZeroU32::MIN
}

#[cfg(test)]
mod tests {
    use super::*;
    use sv_protocol::intent::IntentKind;

    fn catalog() -> Vec<String> {
        ["coke", "pepsi", "sprite", "fanta", "mountain dew", "dr pepper"]
            .map(String::from)
            .to_vec()
    }

    fn classify(message: &str) -> ParsedIntent {
        RuleClassifier::new().classify(message, &catalog())
    }

    // ── Scenario table ──────────────────────────────────────────

    #[test]
    fn buy_three_cokes() {
        let intent = classify("I want to buy 3 cokes");
        assert_eq!(intent.intent(), IntentKind::Purchase);
        assert_eq!(intent.product_name(), Some("coke"));
        assert_eq!(intent.quantity().unwrap().get(), 3);
        assert_eq!(intent.confidence(), 0.7);
    }

    #[test]
    fn give_me_a_sprite() {
        let intent = classify("Give me a sprite");
        assert_eq!(intent.intent(), IntentKind::Purchase);
        assert_eq!(intent.product_name(), Some("sprite"));
        assert_eq!(intent.quantity().unwrap().get(), 1);
        assert_eq!(intent.confidence(), 0.7);
    }

    #[test]
    fn what_do_you_have() {
        let intent = classify("What do you have?");
        assert_eq!(intent.intent(), IntentKind::Query);
        assert_eq!(intent.product_name(), None);
        assert_eq!(intent.confidence(), 0.85);
    }

    #[test]
    fn dont_want_anything() {
        let intent = classify("I don't want to buy anything");
        assert_eq!(intent.intent(), IntentKind::Refuse);
        assert_eq!(intent.confidence(), 0.9);
    }

    #[test]
    fn cancel_my_order() {
        let intent = classify("Cancel my order");
        assert_eq!(intent.intent(), IntentKind::Cancel);
        assert_eq!(intent.confidence(), 0.8);
    }

    #[test]
    fn maybe_later_is_unknown() {
        let intent = classify("Maybe later");
        assert_eq!(intent.intent(), IntentKind::Unknown);
        assert_eq!(intent.confidence(), 0.5);
    }

    // ── Edge cases ──────────────────────────────────────────────

    #[test]
    fn empty_message_is_unknown() {
        let intent = classify("");
        assert_eq!(intent.intent(), IntentKind::Unknown);
        assert_eq!(intent.confidence(), 0.5);
    }

    #[test]
    fn whitespace_only_is_unknown() {
        assert_eq!(classify("   \t  ").intent(), IntentKind::Unknown);
    }

    #[test]
    fn bare_product_name_is_unknown() {
        // No acquisition verb — naming a product is not a purchase.
        let intent = classify("coke");
        assert_eq!(intent.intent(), IntentKind::Unknown);
    }

    #[test]
    fn classification_is_idempotent() {
        let first = classify("I'll take 2 pepsis please");
        let second = classify("I'll take 2 pepsis please");
        assert_eq!(first, second);
    }

    #[test]
    fn never_mind_cancels() {
        assert_eq!(classify("never mind").intent(), IntentKind::Cancel);
    }

    #[test]
    fn no_thanks_refuses() {
        // "no" is negative, "want" is a purchase keyword.
        let intent = classify("no thanks, I don't want one");
        assert_eq!(intent.intent(), IntentKind::Refuse);
    }

    #[test]
    fn stock_question_is_query() {
        assert_eq!(
            classify("how many sodas are in stock?").intent(),
            IntentKind::Query
        );
    }

    #[test]
    fn purchase_without_catalog_match_has_low_confidence() {
        let intent = classify("I want to buy a root beer");
        assert_eq!(intent.intent(), IntentKind::Purchase);
        assert_eq!(intent.product_name(), None);
        assert_eq!(intent.confidence(), 0.3);
    }

    #[test]
    fn catalog_order_decides_ties() {
        // Both names appear; the first catalog entry wins.
        let intent = classify("buy coke or pepsi");
        assert_eq!(intent.product_name(), Some("coke"));
    }

    #[test]
    fn multi_word_product_matches() {
        let intent = classify("can i have a mountain dew");
        assert_eq!(intent.intent(), IntentKind::Purchase);
        assert_eq!(intent.product_name(), Some("mountain dew"));
    }

    #[test]
    fn works_with_empty_catalog() {
        let intent = RuleClassifier::new().classify("buy a coke", &[]);
        assert_eq!(intent.intent(), IntentKind::Purchase);
        assert_eq!(intent.product_name(), None);
    }

    // ── Quantity extraction ─────────────────────────────────────

    #[test]
    fn quantity_from_unit_word() {
        assert_eq!(extract_quantity("give me 5 cans"), NonZeroU32::new(5).unwrap());
        assert_eq!(
            extract_quantity("2 bottles of water"),
            NonZeroU32::new(2).unwrap()
        );
    }

    #[test]
    fn quantity_after_verb() {
        assert_eq!(extract_quantity("i need 4 of those"), NonZeroU32::new(4).unwrap());
    }

    #[test]
    fn quantity_before_bare_brand() {
        assert_eq!(
            extract_quantity("3 dr pepper to go"),
            NonZeroU32::new(3).unwrap()
        );
    }

    #[test]
    fn unit_pattern_outranks_verb_pattern() {
        // "buy 2" would capture 2, but "6 cans" matches the higher-priority
        // unit pattern first.
        assert_eq!(
            extract_quantity("buy 2 packs with 6 cans"),
            NonZeroU32::new(6).unwrap()
        );
    }

    #[test]
    fn article_means_one() {
        assert_eq!(extract_quantity("an ice cold coke"), NonZeroU32::MIN);
        assert_eq!(extract_quantity("one sprite"), NonZeroU32::MIN);
    }

    #[test]
    fn missing_quantity_defaults_to_one() {
        assert_eq!(extract_quantity("buy coke"), NonZeroU32::MIN);
    }

    #[test]
    fn explicit_zero_falls_through_to_default() {
        // "0 cokes" captures zero, which is not a legal quantity; extraction
        // continues and lands on the default.
        assert_eq!(extract_quantity("buy 0 cokes"), NonZeroU32::MIN);
    }

    #[test]
    fn oversized_digit_run_is_skipped() {
        assert_eq!(extract_quantity("buy 99999999999999999999 cokes"), NonZeroU32::MIN);
    }

    // ── Invariants ──────────────────────────────────────────────

    #[test]
    fn all_outcomes_have_valid_confidence_and_reasoning() {
        for message in [
            "",
            "buy 3 cokes",
            "what's available",
            "cancel",
            "don't want to buy",
            "qwerty",
        ] {
            let intent = classify(message);
            assert!((0.0..=1.0).contains(&intent.confidence()), "{message}");
            assert!(!intent.reasoning().is_empty(), "{message}");
        }
    }
}
