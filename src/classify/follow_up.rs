//! Follow-up question banks.
//!
//! Only relationship, career and health questions get a follow-up; the pick
//! is indexed by a caller-supplied seed (the server passes the clock).

use super::PredictionTopic;

const CAREER: &[&str] = &[
    "Aapka current job role kya hai aur kya aap usse satisfied hain?",
    "Kya aap job change ya promotion ke baare mein soch rahe hain?",
    "Aapke career goals kya hain jo aap achieve karna chahte hain?",
    "Kya aap koi naya business start karna chahte hain?",
    "Aapke field mein kya challenges aa rahe hain?",
    "Kya aapko lagta hai ki aapka talent properly utilize ho raha hai?",
    "Aapke dream job kya hai aur uske liye kya karna hoga?",
    "Kya aapko lagta hai ki aapka current role aapke potential ke saath match karta hai?",
    "Aapke industry mein future prospects kya lagte hain?",
    "Kya aapko lagta hai ki aapka boss aapko appreciate karta hai?",
    "Aapke colleagues ke saath relationship kaise hai?",
    "Kya aapko lagta hai ki aapka work-life balance theek hai?",
    "Aapke field mein kya skills develop karni chahiye?",
    "Kya aapko lagta hai ki aapka current company mein growth hai?",
    "Aapke career mein kya biggest achievement hai ab tak?",
];

const RELATIONSHIP: &[&str] = &[
    "Kya aapke rishte ki baat chal rahi hai kya?",
    "Aapki current relationship status kya hai?",
    "Kya aap marriage ke liye ready hain ya koi specific concerns hain?",
    "Aapke family mein koi pressure hai marriage ke liye?",
    "Aapke partner ke saath kya issues hain jo solve karni hain?",
    "Kya aapko lagta hai ki aapka partner aapko samajhta hai?",
    "Aapke relationship mein trust ki situation kaise hai?",
    "Kya aapko lagta hai ki aapka partner aapke dreams ko support karta hai?",
    "Aapke relationship mein communication kaise hai?",
    "Kya aapko lagta hai ki aapka partner aapke family ko pasand karta hai?",
    "Aapke relationship mein kya biggest challenge hai?",
    "Kya aapko lagta hai ki aapka partner aapke career ko support karta hai?",
    "Aapke relationship mein romance kaise hai?",
    "Kya aapko lagta hai ki aapka partner aapke values ke saath match karta hai?",
    "Aapke relationship mein future planning kaise hai?",
];

const HEALTH: &[&str] = &[
    "Aapko koi specific health issues hain jo aapko pareshan kar rahe hain?",
    "Kya aap regular exercise aur healthy diet follow karte hain?",
    "Aapke family mein koi hereditary health problems hain?",
    "Kya aap stress ya anxiety se deal kar rahe hain?",
    "Aapki sleep pattern kaise hai?",
    "Kya aapko lagta hai ki aapka energy level theek hai?",
    "Aapke daily routine mein kya health activities hain?",
    "Kya aapko lagta hai ki aapka mental health theek hai?",
    "Aapke diet mein kya improvements kar sakte hain?",
    "Kya aapko lagta hai ki aapka work stress aapke health ko affect kar raha hai?",
    "Aapke family mein koi health history hai jo aapko concern karti hai?",
    "Kya aapko lagta hai ki aapka lifestyle healthy hai?",
    "Aapke health goals kya hain jo aap achieve karna chahte hain?",
    "Kya aapko lagta hai ki aapka environment healthy hai?",
    "Aapke health mein kya biggest concern hai?",
];

/// Ways of introducing the follow-up to the model.
pub const FOLLOW_UP_INTROS: &[&str] = &[
    "At the very end of your response, gently ask the user this question to continue the flow:",
    "End your response by asking this follow-up question naturally:",
    "Conclude your response with this question to keep the conversation flowing:",
    "Finish your response by asking this question to engage the user further:",
    "End with this question to continue the meaningful conversation:",
];

/// The bank for a topic, if it gets follow-ups at all.
pub fn follow_up_questions(topic: PredictionTopic) -> Option<&'static [&'static str]> {
    match topic {
        PredictionTopic::Career => Some(CAREER),
        PredictionTopic::Relationship => Some(RELATIONSHIP),
        PredictionTopic::Health => Some(HEALTH),
        PredictionTopic::Children | PredictionTopic::General => None,
    }
}

/// Prompt instruction asking for one follow-up question, or an empty string.
pub fn follow_up_instruction(topic: PredictionTopic, seed: u64) -> String {
    let Some(bank) = follow_up_questions(topic) else {
        return String::new();
    };
    let question = bank[(seed % bank.len() as u64) as usize];
    let intro = FOLLOW_UP_INTROS[((seed / 7) % FOLLOW_UP_INTROS.len() as u64) as usize];
    format!("{} '{}'", intro, question)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banks_are_full() {
        for topic in [
            PredictionTopic::Career,
            PredictionTopic::Relationship,
            PredictionTopic::Health,
        ] {
            assert_eq!(follow_up_questions(topic).unwrap().len(), 15);
        }
    }

    #[test]
    fn test_no_follow_up_for_children_or_general() {
        assert!(follow_up_instruction(PredictionTopic::Children, 3).is_empty());
        assert!(follow_up_instruction(PredictionTopic::General, 3).is_empty());
    }

    #[test]
    fn test_instruction_is_seeded() {
        let first = follow_up_instruction(PredictionTopic::Career, 0);
        assert_eq!(
            first,
            format!("{} '{}'", FOLLOW_UP_INTROS[0], CAREER[0])
        );
        assert_eq!(first, follow_up_instruction(PredictionTopic::Career, 0));
        let other = follow_up_instruction(PredictionTopic::Career, 16);
        assert!(other.contains(CAREER[1]));
        assert!(other.starts_with(FOLLOW_UP_INTROS[2]));
    }
}
