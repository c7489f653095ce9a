//! Consultation prompt assembly.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::classify::PredictionTopic;
use crate::prediction::PredictionContext;

static EXTRA_BLANK_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t]*(\n[ \t]*){2,}").unwrap());

/// Everything that goes into one grounded consultation prompt.
#[derive(Debug, Clone)]
pub struct PromptParts<'a> {
    pub question: &'a str,
    pub user_name: &'a str,
    pub context: &'a PredictionContext,
    /// Compact chart JSON, already size-capped.
    pub chart_context: &'a str,
    /// Retrieved rule text, already size-capped; may be empty.
    pub knowledge_context: &'a str,
    /// Follow-up instruction; may be empty.
    pub follow_up: &'a str,
    /// Rendered remedy block; empty when the distress gate did not fire.
    pub remedies: &'a str,
}

fn age_logic_block(ctx: &PredictionContext) -> String {
    let constraint = &ctx.constraint;
    let earliest = ctx.earliest_prediction_year();
    let mut block = format!(
        "INTERNAL AGE/LOGIC CONTEXT:\n\
User was born in {birth}. Current age: {age}. Current year: {year}.\n\
Minimum realistic age for this event is {min_age} years.\n\
Prediction year MUST be >= {realistic} AND >= {year}.\n\
If the dasha data shows a favorable time before {earliest}, ignore it and find the next favorable timing from {earliest} onwards.",
        birth = constraint.birth_year,
        age = ctx.current_age,
        year = ctx.current_year,
        min_age = constraint.minimum_age,
        realistic = constraint.earliest_realistic_year,
        earliest = earliest,
    );
    if ctx.topic == PredictionTopic::Children {
        block.push_str(&format!(
            "\nCHILD CHRONOLOGY RULE (NON-NEGOTIABLE): the base prediction year for children is {child} (age {min_age}), one year after the earliest realistic marriage year ({marriage}). Do not predict any childbirth before {child}.",
            child = constraint.earliest_child_year(),
            min_age = constraint.minimum_age,
            marriage = constraint.earliest_marriage_year,
        ));
    }
    if ctx.birth_date_assumed {
        block.push_str("\nThe exact birth date is unknown; keep timing statements broad.");
    }
    block
}

/// Render the full prompt sent as a single user message.
pub fn build_consultation_prompt(parts: &PromptParts<'_>) -> String {
    let ctx = parts.context;
    let follow_up = if parts.follow_up.is_empty() {
        "End with a blessing only; do not ask a generic question.".to_string()
    } else {
        parts.follow_up.to_string()
    };
    let remedies = if parts.remedies.is_empty() {
        String::new()
    } else {
        format!(
            "MANDATORY: You MUST include these EXACT remedies in your response as plain text (copy them exactly): {}",
            parts.remedies
        )
    };

    let prompt = format!(
        r#"You are AstroBot, an experienced, calm and compassionate KP Jyotishacharya (Digital Pandit Ji).
Answer in warm Hinglish with this structure:
1. Open with a spiritual acknowledgment, e.g. "Aapka sawaal uttam hai, {name} ji...".
2. State the prediction in narrative form with SPECIFIC future timeframes ({year} onwards).
3. For questions about children use the heading '🔮 Santan Yog Prediction'.
4. Close with a blessing ("Shri Sitaram...") and the follow-up question.

TONE & STYLE RULES:
- Keep the core prediction to 3-5 sentences.
- NEVER mention planets, houses, signs, dashas, sub-lords, yogas or any other astrological terminology in the answer. Use them only internally.
- SINGLE FOLLOW-UP ONLY: {follow_up}
- If remedies are provided, include them as plain text (no markdown, no headers) before the blessing.

ACCURACY RULES:
- Base the answer strictly on the CHART DATA and KP KNOWLEDGE below.
- The current year is {year}; every prediction must name a year from {year} onwards.
- Prediction year MUST be >= the earliest realistic year ({realistic}).
- For children, the prediction year MUST be at least one year after the earliest realistic marriage year ({marriage}).
- Source timing from the dasha periods, e.g. 'mid-{next}', '{next}-{after}'.

Response style: {style}

User's question: "{question}"

CHART DATA (internal reference):
{chart}

KP ASTROLOGY KNOWLEDGE (internal reference):
{knowledge}

{age_logic}

Provide the response now, following ALL the rules above.
{remedies}"#,
        name = parts.user_name,
        year = ctx.current_year,
        follow_up = follow_up,
        realistic = ctx.constraint.earliest_realistic_year,
        marriage = ctx.constraint.earliest_marriage_year,
        next = ctx.current_year + 1,
        after = ctx.current_year + 2,
        style = ctx.topic.style_label(),
        question = parts.question,
        chart = parts.chart_context,
        knowledge = parts.knowledge_context,
        age_logic = age_logic_block(ctx),
        remedies = remedies,
    );
    EXTRA_BLANK_LINES
        .replace_all(prompt.trim_end(), "\n\n")
        .into_owned()
}
