//! Static remedy bundles and their rendering.
//!
//! The rendered block is pasted into prompts with an instruction to copy it
//! verbatim, so the layout (free, then paid, then activation) is fixed.

use serde::Serialize;

use crate::classify::{classify_topic, TopicBucket};

/// Free ritual, paid items and display label for one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RemedyBundle {
    pub free_remedy: &'static str,
    pub paid_options: [&'static str; 3],
    pub category_label: &'static str,
}

/// Energizing instructions shared by every bundle.
pub const ACTIVATION_PROCESS: &str = "Apne item ko pehenne se pehle, usey Ganga Jal ya kachche doodh se saaf karein aur dhoop/chaandni mein energize karein. Is dauran 'Om Namah Shivaya' ka 11 baar jaap karein.";

const CAREER: RemedyBundle = RemedyBundle {
    free_remedy: "Har subah, copper ke bartan se Surya Dev ko jal arpit karein (Surya Arghya). Isse aapka aatmavishwas aur netritva ki kshamta badhegi.",
    paid_options: [
        "Pyrite Bracelet: Aapke career aur dhan ki growth mein madad karta hai.",
        "Tiger Eye Bracelet: Aapko himmat aur focus deta hai.",
        "Small Kuber Yantra or Gomti Chakra: Apne desk par rakhein sampannta aur naye avsaron ke liye.",
    ],
    category_label: "Career aur Business",
};

const RELATIONSHIP: RemedyBundle = RemedyBundle {
    free_remedy: "Shukrawar (Friday) ki shaam ko peepal ke ped ko doodh/jal arpit karein (peepal ke ped ko jal dene se rishte mazboot hote hain).",
    paid_options: [
        "Rose Quartz Bracelet: Pyaar aur achhe rishton ko aakarshit karta hai.",
        "Gauri Shankar Rudraksha: Jeevan saathi ke saath bandhan mazboot karta hai.",
        "Shukra Yantra: Ise ghar mein rakhne se partnership ki energy achhi rehti hai.",
    ],
    category_label: "Love aur Relationship",
};

const MARRIAGE: RemedyBundle = RemedyBundle {
    free_remedy: "Guruwar (Thursday) ka vrat rakhein ya gau mata ko hara chara khilayein (gair-khati ghass).",
    paid_options: [
        "Rose Quartz Bracelet: Shadi aur achhe rishton mein madad karta hai.",
        "Gauri Shankar Rudraksha: Vivah mein deri door karta hai aur dampatya sukh deta hai.",
        "Shukra Yantra: Prem aur sahayog badhane ke liye use karein.",
    ],
    category_label: "Marriage aur Compatibility",
};

const CHILDREN: RemedyBundle = RemedyBundle {
    free_remedy: "Bhagwan Krishna ki pooja karein aur Shukrawar ko unhe doodh ya makhan ka bhog lagayein.",
    paid_options: [
        "Putra Prapti Yantra (ya Haridra Ganesh Yantra): Santan sukh ke liye ashirwad deta hai.",
        "Moti (Pearl) Stone: Mann ki shanti aur matritva shakti ko badhata hai.",
        "Gauri Shankar Rudraksha: Parivar ki ekta aur unnati ke liye accha hai.",
    ],
    category_label: "Santan Prapti aur Family Growth",
};

const PROPERTY: RemedyBundle = RemedyBundle {
    free_remedy: "Har shaam ghar ke mukhya dwar (main entrance) par ek diya (deepak) jalayein.",
    paid_options: [
        "Turquoise Stone: Ghar ki suraksha aur sthirta ke liye.",
        "Vastu Yantra: Ghar ke North-East kone mein rakhein Vastu dosh dur karne ke liye.",
        "Red Jasper Bracelet: Zameen se jude vivaad aur sthirta ke liye.",
    ],
    category_label: "Property aur Home Stability",
};

const LITIGATION: RemedyBundle = RemedyBundle {
    free_remedy: "Mangalwar aur Shanivar ko Hanuman Chalisa ka path karein.",
    paid_options: [
        "Ganesha Yantra: Rukavatein (obstacles) hatane aur vivaad mein safalta ke liye.",
        "Tiger Eye Bracelet: Himmat aur focus deta hai court case ke dauran.",
        "Blue Sapphire (Neelam): Nyay aur jeet ke liye. (Astrologer ki salah zaroori hai pehenne se pehle).",
    ],
    category_label: "Litigation aur Court Case",
};

const FINANCE: RemedyBundle = RemedyBundle {
    free_remedy: "Har roz, khaaskar Shukrawar ko, Kanakadhara Stotram ka path karein.",
    paid_options: [
        "Green Aventurine Bracelet: Dhan aur naye avsaron ko aakarshit karta hai (Stone of Opportunity).",
        "Shri Yantra: Cash box ya North-East kone mein rakhein dhan ki lagatar flow ke liye.",
        "Citrine Stone: Aamdani (abundance) badhane aur financial blockages hatane ke liye.",
    ],
    category_label: "Finance, Money aur Prosperity",
};

const HEALTH_GENERAL: RemedyBundle = RemedyBundle {
    free_remedy: "Har din Om Namah Shivaya mantra ka 108 baar jaap karein (apne saans par dhyaan dete hue).",
    paid_options: [
        "Amethyst Stone: Stress aur man ki shanti ke liye.",
        "Tulsi Mala: Swasthya (health), suraksha aur shuddhi (purification) ke liye pehnein.",
        "Health Yantra: Recovery aur urja ke liye apne bed ke paas rakhein.",
    ],
    category_label: "Health, Energy aur Peace",
};

/// The bundle for a bucket.
pub fn remedy_bundle(bucket: TopicBucket) -> &'static RemedyBundle {
    match bucket {
        TopicBucket::Career => &CAREER,
        TopicBucket::Relationship => &RELATIONSHIP,
        TopicBucket::Marriage => &MARRIAGE,
        TopicBucket::Children => &CHILDREN,
        TopicBucket::Property => &PROPERTY,
        TopicBucket::Litigation => &LITIGATION,
        TopicBucket::Finance => &FINANCE,
        TopicBucket::HealthGeneral => &HEALTH_GENERAL,
    }
}

/// Render the remedy block for a bucket.
///
/// Compact mode is one free line, the first paid option and the activation
/// line; full mode lists all three paid options under a category header.
pub fn render_remedies(bucket: TopicBucket, compact: bool) -> String {
    let bundle = remedy_bundle(bucket);
    if compact {
        format!(
            "\n\nUpay {}\n1. {}\n2. {}\nActivation: {}",
            bundle.category_label, bundle.free_remedy, bundle.paid_options[0], ACTIVATION_PROCESS
        )
    } else {
        format!(
            "\n---\n\n{} ke liye upay:\n- Free: {}\n- Paid options: \n  - {}\n- Activation: {}",
            bundle.category_label,
            bundle.free_remedy,
            bundle.paid_options.join("\n  - "),
            ACTIVATION_PROCESS
        )
    }
}

/// Classify the question and render its remedies.
pub fn generate_remedies(question: &str, compact: bool) -> String {
    render_remedies(classify_topic(question), compact)
}
