use std::sync::LazyLock;

use regex::Regex;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}\b")
        .expect("email regex should compile")
});

/// US formats first, then `+`-prefixed international numbers. The
/// international pattern requires the plus so years and prices survive.
static PHONES: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b").expect("phone regex should compile"),
        Regex::new(r"\(\d{3}\)\s?\d{3}[-.]?\d{4}\b").expect("phone regex should compile"),
        Regex::new(r"\+\d{1,3}[-.\s]?\d{1,4}[-.\s]?\d{1,4}[-.\s]?\d{1,9}\b")
            .expect("phone regex should compile"),
    ]
});

static ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b\d+\s+[A-Za-z\s]+(?:Street|St|Avenue|Ave|Road|Rd|Drive|Dr|Lane|Ln|Boulevard|Blvd|Way|Court|Ct|Place|Pl)\b",
    )
    .expect("address regex should compile")
});

pub const EMAIL_PLACEHOLDER: &str = "[email removed]";
pub const PHONE_PLACEHOLDER: &str = "[phone removed]";
pub const ADDRESS_PLACEHOLDER: &str = "[address removed]";

/// Replace emails, phone numbers and street addresses with placeholders.
pub fn scrub_pii(text: &str) -> String {
    let mut cleaned = EMAIL.replace_all(text, EMAIL_PLACEHOLDER).into_owned();
    for pattern in PHONES.iter() {
        cleaned = pattern.replace_all(&cleaned, PHONE_PLACEHOLDER).into_owned();
    }
    ADDRESS.replace_all(&cleaned, ADDRESS_PLACEHOLDER).into_owned()
}
