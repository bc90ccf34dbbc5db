use std::sync::LazyLock;

use regex::Regex;

use super::{ModerationReason, ModerationVerdict, Moderator, scrub_pii};

const MIN_LENGTH: usize = 3;
const MAX_LENGTH: usize = 5000;

/// Hate speech, threats and harassment.
static UNSAFE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)\b(kill|murder|death\s+threat|die|harm)\s+(yourself|your\s+self|you|them|him|her)\b",
        r"(?i)\b(racist|racism|nazi|kkk|white\s+supremacy)\b",
        r"(?i)\b(f\*\*k\s+you|f\s+u\s+c\s+k|go\s+to\s+hell|damn\s+you)\b",
        r"(?i)\b(threat|threatening|harass|harassing)\b",
    ])
});

/// Direct accusations against a pronoun or an activity.
static ACCUSATIONS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)\b(you|they|he|she|him|her)\s+(stole|is\s+a\s+thief|committed\s+fraud|is\s+a\s+scammer)\b",
        r"(?i)\b(you|they|he|she)\s+(are|is)\s+(a\s+liar|lying|deceiving)\b",
        r"(?i)\b(you|they|he|she)\s+(abused|committed\s+violence|is\s+violent)\b",
        r"(?i)\b(criminal|illegal|lawsuit|sue|suing)\s+(activity|act|action|behavior)\b",
    ])
});

/// A capitalized name followed by an accusation ("John stole the money").
static NAMED_ACCUSATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z][a-z]+)\s+(?i:stole|is\s+a\s+thief|committed\s+fraud|is\s+a\s+scammer)\b")
        .expect("named accusation regex should compile")
});

/// Accusations still blocked when the target is a public figure.
static CRIMINAL: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)\b(you|they|he|she)\s+(committed\s+fraud|is\s+a\s+scammer|stole)\b",
        r"(?i)\b(criminal|illegal)\s+(activity|act|action)\b",
    ])
});

static NAMED_CRIMINAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z][a-z]+)\s+(?i:committed\s+fraud|is\s+a\s+scammer|stole)\b")
        .expect("named criminal regex should compile")
});

/// Festive characters whose mischief is part of the season ("The Grinch stole
/// Christmas"). A capitalized accusation against one of them is not about a
/// real person.
const HOLIDAY_CHARACTERS: &[&str] = &[
    "santa", "grinch", "rudolph", "frosty", "scrooge", "krampus", "elf", "dasher", "dancer",
    "prancer", "vixen", "comet", "cupid", "donner", "blitzen",
];

const PUBLIC_FIGURES: &[&str] = &[
    "biden",
    "trump",
    "obama",
    "bush",
    "clinton",
    "harris",
    "pence",
    "pelosi",
    "mcconnell",
    "schumer",
    "taylor swift",
    "beyonce",
    "oprah",
    "elon musk",
    "bill gates",
];

static PUBLIC_FIGURE: LazyLock<Regex> = LazyLock::new(|| {
    let names = PUBLIC_FIGURES
        .iter()
        .map(|name| name.split_whitespace().collect::<Vec<_>>().join(r"\s+"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b({names})\b")).expect("public figure regex should compile")
});

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("moderation regex should compile"))
        .collect()
}

fn any_match(patterns: &[Regex], text: &str) -> bool {
    patterns.iter().any(|p| p.is_match(text))
}

fn accuses_named_person(pattern: &Regex, text: &str) -> bool {
    pattern.captures_iter(text).any(|caps| {
        let name = caps[1].to_lowercase();
        !HOLIDAY_CHARACTERS.contains(&name.as_str())
    })
}

pub fn mentions_public_figure(text: &str) -> bool {
    PUBLIC_FIGURE.is_match(text)
}

fn check_defamation(text: &str) -> Option<ModerationReason> {
    if !any_match(&ACCUSATIONS, text) && !accuses_named_person(&NAMED_ACCUSATION, text) {
        return None;
    }
    if !mentions_public_figure(text) {
        return Some(ModerationReason::Defamatory);
    }
    // Public figures are open to criticism, not to criminal accusations.
    let criminal = any_match(&CRIMINAL, text) || accuses_named_person(&NAMED_CRIMINAL, text);
    criminal.then_some(ModerationReason::CriminalAccusation)
}

/// Keyword and pattern based moderator.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicModerator;

impl Moderator for HeuristicModerator {
    fn classify(&self, text: &str) -> ModerationVerdict {
        let cleaned = scrub_pii(text);

        if any_match(&UNSAFE, &cleaned) {
            return ModerationVerdict::block(cleaned, ModerationReason::Inappropriate);
        }

        if let Some(reason) = check_defamation(&cleaned) {
            return ModerationVerdict::block(cleaned, reason);
        }

        if cleaned.trim().chars().count() < MIN_LENGTH {
            return ModerationVerdict::block(cleaned, ModerationReason::TooShort);
        }

        if cleaned.chars().count() > MAX_LENGTH {
            return ModerationVerdict::block(cleaned, ModerationReason::TooLong);
        }

        ModerationVerdict::allow(cleaned)
    }
}
