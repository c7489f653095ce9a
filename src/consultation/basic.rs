//! Canned replies for chat without a chart or without a model.

pub const GREETING_REPLY: &str = "Namaste! 🙏 Main Pandit ji hun. Aapka swagat hai AstroRemedis mein!";

pub const KUNDLI_REQUEST_REPLY: &str = "Aapka Kundli analysis karne ke liye, main aapke birth details chahiye. Kripya apna date of birth, time of birth aur place of birth batayiye.";

pub const DEFAULT_REPLY: &str = "Namaste! 🙏 Main aapki astrology-related queries solve kar sakta hun. Aap kya jaanna chahte hain? Kundli, horoscope, marriage, career, health, ya koi aur topic?";

/// Returned by analysis when no model is configured.
pub const OFFLINE_REPLY: &str = "Sorry, main abhi online nahi hun. Kripya thodi der baad try karein.";

const GREETING_WORDS: &[&str] = &["hello", "hi", "namaste", "namaskar", "pranam"];
const KUNDLI_WORDS: &[&str] = &["kundli", "horoscope", "chart", "birth chart"];

/// Topic keyword to canned guidance, checked in order.
const TOPIC_REPLIES: &[(&str, &str)] = &[
    ("marriage", "Marriage ke liye main aapke 7th house aur Venus position check karunga. Birth details chahiye."),
    ("career", "Career guidance ke liye main aapke 10th house aur Saturn position analyze karunga."),
    ("health", "Health ke liye main aapke 6th house aur Mars position check karunga."),
    ("finance", "Finance aur wealth ke liye main aapke 2nd house aur Jupiter position analyze karunga."),
    ("education", "Education ke liye main aapke 5th house aur Mercury position check karunga."),
    ("travel", "Travel ke liye main aapke 9th house aur Jupiter position analyze karunga."),
    ("property", "Property ke liye main aapke 4th house aur Moon position check karunga."),
    ("children", "Children ke liye main aapke 5th house aur Jupiter position analyze karunga."),
];

/// Keyword-routed canned reply. Greeting beats kundli beats topics.
pub fn basic_response(message: &str) -> &'static str {
    let lowered = message.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| lowered.contains(w));

    if has(GREETING_WORDS) {
        return GREETING_REPLY;
    }
    if has(KUNDLI_WORDS) {
        return KUNDLI_REQUEST_REPLY;
    }
    TOPIC_REPLIES
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, reply)| *reply)
        .unwrap_or(DEFAULT_REPLY)
}
