use crate::data::types::SessionLevel;

/// Products sold next to surf sessions that must never be read as a session price.
const NON_SESSION_WORDS: &[&str] = &[
    "GIFT", "VOUCHER", "MERCH", "CABANA", "BEACH PASS", "LODGING",
    "ACCOMMODATION", "LESSON", "COACHING", "CAMP", "ADAPTIVE",
    "BODYBOARD", "BOOGIE", "SPECTATOR", "WETSUIT", "RENTAL",
];

const ADVANCED_WORDS: &[&str] = &[
    "ADVANCED", "EXPERT", "PRO ", "PRO BARREL", "HIGH PERFORMANCE",
    "BARREL", "MANOEUVRE", "TURNS 3", "TURNS 2",
];

const INTERMEDIATE_WORDS: &[&str] = &[
    "INTERMEDIATE", "PROGRESSIVE", "CRUISER", "TURNS ", "NOVICE", "IMPROVER",
];

const BEGINNER_WORDS: &[&str] = &[
    "BEGINNER", "LEARN TO SURF", "FIRST WAVE", "INTRO", "STARTER",
];

pub fn is_non_session(name: &str) -> bool {
    let upper = name.to_uppercase();
    NON_SESSION_WORDS.iter().any(|w| upper.contains(w))
}

/// Map a session title to a level. Checked most specific first, so
/// "Turns 2" is advanced even though "Turns " alone means intermediate.
pub fn categorize(name: &str) -> Option<SessionLevel> {
    let upper = name.to_uppercase();

    if NON_SESSION_WORDS.iter().any(|w| upper.contains(w)) {
        return None;
    }
    if ADVANCED_WORDS.iter().any(|w| upper.contains(w)) {
        return Some(SessionLevel::Advanced);
    }
    if INTERMEDIATE_WORDS.iter().any(|w| upper.contains(w)) {
        return Some(SessionLevel::Intermediate);
    }
    if BEGINNER_WORDS.iter().any(|w| upper.contains(w)) {
        return Some(SessionLevel::Beginner);
    }
    None
}
