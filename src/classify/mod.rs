//! Keyword classifiers over free-text questions.
//!
//! Three independent, pure classifiers live here:
//!
//! - [`classify_topic`] routes a question to a [`TopicBucket`] for remedy
//!   selection.
//! - [`should_append_remedies`] gates remedies to questions that express a
//!   problem, so neutral questions stay remedy-free.
//! - [`classify_prediction_topic`] picks the [`PredictionTopic`] that drives
//!   age gating and the follow-up question.
//!
//! All matching is lower-cased substring containment with a fixed priority
//! order. Keyword sets overlap ("delay" is both a marriage keyword and a
//! distress marker), so the result is a best-effort routing decision rather
//! than intent inference.

pub mod follow_up;

use serde::{Deserialize, Serialize};

pub use follow_up::{follow_up_instruction, follow_up_questions, FOLLOW_UP_INTROS};

/// Subject category used to select remedies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicBucket {
    Career,
    Relationship,
    Marriage,
    Children,
    Property,
    Litigation,
    Finance,
    HealthGeneral,
}

impl Default for TopicBucket {
    fn default() -> Self {
        Self::HealthGeneral
    }
}

impl TopicBucket {
    /// Every bucket, in classification priority order.
    pub const ALL: [TopicBucket; 8] = [
        Self::Career,
        Self::Relationship,
        Self::Marriage,
        Self::Children,
        Self::Property,
        Self::Litigation,
        Self::Finance,
        Self::HealthGeneral,
    ];

    /// Trigger keywords. The default bucket has none.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Career => &["job", "business", "career", "naukri", "rozi", "work"],
            Self::Relationship => &["partner", "relationship", "love", "pyaar"],
            Self::Marriage => &["marriage", "shadi", "vivah", "delays"],
            Self::Children => &["child", "santan", "baby", "bacche", "family growth"],
            Self::Property => &["property", "home", "land", "dispute"],
            Self::Litigation => &["court case", "litigation", "case"],
            Self::Finance => &["money", "finance", "wealth", "prosperity"],
            Self::HealthGeneral => &[],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Career => "career",
            Self::Relationship => "relationship",
            Self::Marriage => "marriage",
            Self::Children => "children",
            Self::Property => "property",
            Self::Litigation => "litigation",
            Self::Finance => "finance",
            Self::HealthGeneral => "health_general",
        }
    }
}

/// Markers of a problem, delay or worry.
pub const DISTRESS_MARKERS: &[&str] = &[
    "problem",
    "issue",
    "dikkat",
    "pareshani",
    "musibat",
    "ruk",
    "delay",
    "deri",
    "nahi mil",
    "nahi ho",
    "stuck",
    "loss",
    "down",
    "court",
    "case",
    "breakup",
    "health issue",
    "bimari",
    "paise ki dikkat",
    "financial problem",
    "job nahi",
    "promotion nahi",
    "marriage delay",
    "santan nahi",
    "tension",
    "worried",
    "concerned",
    "anxiety",
    "stress",
    "chinta",
    "fikar",
];

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Route a question to its remedy bucket. Total: unmatched text lands in
/// [`TopicBucket::HealthGeneral`].
pub fn classify_topic(text: &str) -> TopicBucket {
    let lowered = text.to_lowercase();
    TopicBucket::ALL
        .iter()
        .copied()
        .find(|bucket| contains_any(&lowered, bucket.keywords()))
        .unwrap_or_default()
}

/// True only when the question expresses a problem.
pub fn should_append_remedies(text: &str) -> bool {
    if text.trim().is_empty() {
        return false;
    }
    contains_any(&text.to_lowercase(), DISTRESS_MARKERS)
}

/// Question type that drives age gating and follow-up selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionTopic {
    Relationship,
    Children,
    Career,
    Health,
    General,
}

impl Default for PredictionTopic {
    fn default() -> Self {
        Self::General
    }
}

impl PredictionTopic {
    pub const ALL: [PredictionTopic; 5] = [
        Self::Relationship,
        Self::Children,
        Self::Career,
        Self::Health,
        Self::General,
    ];

    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Relationship => &["love", "marriage", "relationship", "shadi", "pyaar", "vivah"],
            Self::Children => &["child", "santan", "baby", "bacche"],
            Self::Career => &["career", "job", "profession", "work", "rozi", "naukri"],
            Self::Health => &["health", "swasthya", "illness", "disease"],
            Self::General => &[],
        }
    }

    /// Label used inside prompts and logs.
    pub fn style_label(self) -> &'static str {
        match self {
            Self::Relationship => "relationship_advice",
            Self::Children => "child_guidance",
            Self::Career => "career_guidance",
            Self::Health => "health_guidance",
            Self::General => "general_astrology",
        }
    }

    /// Bucket whose age rule applies to this topic.
    pub fn bucket(self) -> TopicBucket {
        match self {
            Self::Relationship => TopicBucket::Relationship,
            Self::Children => TopicBucket::Children,
            Self::Career => TopicBucket::Career,
            Self::Health | Self::General => TopicBucket::HealthGeneral,
        }
    }
}

/// Classify a question for the prediction context.
pub fn classify_prediction_topic(text: &str) -> PredictionTopic {
    let lowered = text.to_lowercase();
    PredictionTopic::ALL
        .iter()
        .copied()
        .find(|topic| contains_any(&lowered, topic.keywords()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_priority_order() {
        assert_eq!(classify_topic("Meri naukri kab lagegi?"), TopicBucket::Career);
        assert_eq!(classify_topic("Is my partner loyal?"), TopicBucket::Relationship);
        assert_eq!(classify_topic("Shadi kab hogi?"), TopicBucket::Marriage);
        assert_eq!(classify_topic("Santan sukh kab milega"), TopicBucket::Children);
        assert_eq!(classify_topic("Will I buy land this year"), TopicBucket::Property);
        assert_eq!(classify_topic("Litigation ka result"), TopicBucket::Litigation);
        assert_eq!(classify_topic("Wealth kab aayegi"), TopicBucket::Finance);
    }

    #[test]
    fn test_first_matching_bucket_wins() {
        // career outranks marriage and finance
        assert_eq!(classify_topic("job after marriage and money"), TopicBucket::Career);
        // relationship outranks marriage
        assert_eq!(classify_topic("love marriage possible?"), TopicBucket::Relationship);
        // property outranks litigation
        assert_eq!(classify_topic("court case over a property dispute"), TopicBucket::Property);
    }

    #[test]
    fn test_keyword_free_text_is_default() {
        assert_eq!(classify_topic(""), TopicBucket::HealthGeneral);
        assert_eq!(classify_topic("Namaste Pandit ji"), TopicBucket::HealthGeneral);
        assert_eq!(classify_topic("MERA SAWAAL"), TopicBucket::HealthGeneral);
    }

    #[test]
    fn test_classification_is_case_insensitive() {
        assert_eq!(classify_topic("CAREER"), TopicBucket::Career);
        assert_eq!(classify_topic("Prosperity"), TopicBucket::Finance);
    }

    #[test]
    fn test_distress_gate() {
        assert!(!should_append_remedies("career ke bare mein bataiye"));
        assert!(should_append_remedies("job nahi mil raha, stress ho raha hai"));
        assert!(should_append_remedies("Shadi mein DELAY kyun?"));
        assert!(!should_append_remedies("Meri kundli batao"));
        assert!(!should_append_remedies(""));
        assert!(!should_append_remedies("   "));
    }

    #[test]
    fn test_prediction_topic() {
        assert_eq!(classify_prediction_topic("Love life kaisi rahegi"), PredictionTopic::Relationship);
        assert_eq!(classify_prediction_topic("Bacche kab honge"), PredictionTopic::Children);
        assert_eq!(classify_prediction_topic("Profession change?"), PredictionTopic::Career);
        assert_eq!(classify_prediction_topic("Swasthya kaisa rahega"), PredictionTopic::Health);
        assert_eq!(classify_prediction_topic("Kya hoga"), PredictionTopic::General);
        // relationship keywords outrank children keywords
        assert_eq!(
            classify_prediction_topic("marriage ke baad child"),
            PredictionTopic::Relationship
        );
    }

    #[test]
    fn test_prediction_topic_buckets() {
        assert_eq!(PredictionTopic::Children.bucket(), TopicBucket::Children);
        assert_eq!(PredictionTopic::Health.bucket(), TopicBucket::HealthGeneral);
        assert_eq!(PredictionTopic::General.bucket(), TopicBucket::HealthGeneral);
        assert_eq!(PredictionTopic::Career.style_label(), "career_guidance");
    }
}
