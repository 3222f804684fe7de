//! Response-sanity screening for the query pipeline.
//!
//! Plan and generated-SQL text from the language model is screened for
//! three failure classes before it is trusted. Any classification routes
//! through the clarification protocol instead of being silently guessed.

use crate::clarify::Clarification;
use crate::schema::LeadSchema;

/// Indicator phrases suggesting the model drifted into a web lookup.
const WEB_INDICATORS: &[&str] = &[
    "based on the web",
    "according to",
    "search results",
    "i found",
    "from the web",
    "online sources",
    "wikipedia",
    "google",
    "based on my search",
];

/// Indicator phrases suggesting segment names were confused with their
/// sports/gaming homonyms ("Champions" in particular).
const AMBIGUOUS_TERM_INDICATORS: &[&str] = &[
    "league of legends",
    "lol champions",
    "esports",
    "game",
    "player",
    "team",
    "tournament",
    "sports",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureClass {
    /// Off-domain drift: the response references external web content.
    WebSearch,
    /// Lexical ambiguity: a segment name collided with an unrelated common
    /// meaning.
    AmbiguousTerm,
    /// Long free text containing none of the expected query keywords.
    Malformed,
}

/// Screen a model response. Returns the failure class when the text cannot
/// be trusted as a query plan or query.
pub fn screen_response(response: &str) -> Option<FailureClass> {
    let lowered = response.to_lowercase();

    if WEB_INDICATORS.iter().any(|indicator| lowered.contains(indicator)) {
        return Some(FailureClass::WebSearch);
    }

    if AMBIGUOUS_TERM_INDICATORS.iter().any(|indicator| lowered.contains(indicator)) {
        return Some(FailureClass::AmbiguousTerm);
    }

    let uppered = response.to_uppercase();
    let looks_like_query = ["SELECT", "FROM", "CANNOT_ANSWER"]
        .iter()
        .any(|keyword| uppered.contains(keyword));
    if !looks_like_query && response.len() > 100 {
        return Some(FailureClass::Malformed);
    }

    None
}

impl FailureClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WebSearch => "web_search",
            Self::AmbiguousTerm => "ambiguous_term",
            Self::Malformed => "malformed",
        }
    }

    /// The clarification to suspend the turn with.
    pub fn clarification(&self) -> Clarification {
        match self {
            Self::AmbiguousTerm => Clarification::new(
                "Which 'Champions' did you mean?",
                vec![
                    "Champions customer segment".to_string(),
                    "Something else - let me rephrase".to_string(),
                ],
            ),
            Self::WebSearch => Clarification::new(
                "What database information do you need?",
                vec![
                    "Show segment distribution".to_string(),
                    "List top customers".to_string(),
                    "Let me rephrase".to_string(),
                ],
            ),
            Self::Malformed => Clarification::new(
                "Please rephrase your question",
                vec![
                    "Show all segments".to_string(),
                    "Show top customers".to_string(),
                    "Cancel".to_string(),
                ],
            ),
        }
    }

    /// Human-readable notice appended to the message log alongside the
    /// clarification.
    pub fn notice(&self) -> String {
        let schema = LeadSchema;
        match self {
            Self::AmbiguousTerm => "Clarification needed\n\n\
                You mentioned 'Champions'. In this database that is a customer segment name, \
                not a sports or gaming reference.\n\n\
                Did you mean:\n\
                - Option A: the Champions customer segment (high-value customers)\n\
                - Option B: something else\n\n\
                Please select an option or rephrase your question."
                .to_string(),
            Self::WebSearch => format!(
                "Clarification needed\n\n\
                 The request drifted toward a web lookup, but only the leads database can be \
                 queried.\n\n\
                 Could you rephrase to ask about:\n\
                 - customer segments ({})\n\
                 - lead sources, countries, occupations\n\
                 - engagement scores, conversions",
                schema.segments_csv()
            ),
            Self::Malformed => format!(
                "Clarification needed\n\n\
                 That request could not be answered with the leads database.\n\n\
                 Available data:\n\
                 - customer segments: {}\n\
                 - columns: {}",
                schema.segments_csv(),
                schema.columns_csv()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{screen_response, FailureClass};

    #[test]
    fn web_search_drift_is_classified() {
        let class = screen_response("According to recent search results, Champions are...");
        assert_eq!(class, Some(FailureClass::WebSearch));
        assert!(!FailureClass::WebSearch.clarification().options.is_empty());
    }

    #[test]
    fn gaming_confusion_is_classified_as_ambiguous_term() {
        let class = screen_response(
            "Champions is a term from League of Legends where each player picks one.",
        );
        assert_eq!(class, Some(FailureClass::AmbiguousTerm));
    }

    #[test]
    fn long_non_query_prose_is_malformed() {
        let prose = "The best customers are usually the ones who engage the most with your \
                     brand over long periods of time and respond well to outreach.";
        assert!(prose.len() > 100);
        assert_eq!(screen_response(prose), Some(FailureClass::Malformed));
    }

    #[test]
    fn short_non_query_text_is_tolerated() {
        assert_eq!(screen_response("Count rows per segment."), None);
    }

    #[test]
    fn valid_plans_and_queries_pass() {
        assert_eq!(
            screen_response("Select all rows FROM leadscored grouped by Segment, then sort."),
            None
        );
        assert_eq!(screen_response("CANNOT_ANSWER: revenue is not tracked"), None);
    }
}
