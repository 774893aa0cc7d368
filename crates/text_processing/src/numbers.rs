//! Number normalization for English text
//!
//! Rewrites digit grouping ("45,000", "4,50,000") and English number words
//! ("five", "thirty two") as plain digits so the slot patterns only ever
//! see `\d+`.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static DIGIT_GROUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d),(\d)").unwrap());

static NUMBER_WORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:(twenty|thirty|forty|fifty|sixty|seventy|eighty|ninety)(?:[\s-]+(one|two|three|four|five|six|seven|eight|nine))?|(zero|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve|thirteen|fourteen|fifteen|sixteen|seventeen|eighteen|nineteen))\b",
    )
    .unwrap()
});

static ARTICLE_UNIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(for|last|past|about|over|nearly|almost|around|than)\s+(?:a|an)\s+(year|month)\b")
        .unwrap()
});

static HALF_UNIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d+)\s+and\s+a\s+half\s+(years?|months?)\b").unwrap()
});

/// Value of a single English number word below twenty
pub fn unit_value(word: &str) -> Option<u32> {
    let value = match word.to_ascii_lowercase().as_str() {
        "zero" => 0,
        "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        "thirteen" => 13,
        "fourteen" => 14,
        "fifteen" => 15,
        "sixteen" => 16,
        "seventeen" => 17,
        "eighteen" => 18,
        "nineteen" => 19,
        _ => return None,
    };
    Some(value)
}

fn tens_value(word: &str) -> Option<u32> {
    let value = match word.to_ascii_lowercase().as_str() {
        "twenty" => 20,
        "thirty" => 30,
        "forty" => 40,
        "fifty" => 50,
        "sixty" => 60,
        "seventy" => 70,
        "eighty" => 80,
        "ninety" => 90,
        _ => return None,
    };
    Some(value)
}

/// Replace digit grouping commas and number words with plain digits
pub fn normalize_numbers(text: &str) -> String {
    let mut out = text.to_string();
    while DIGIT_GROUP.is_match(&out) {
        out = DIGIT_GROUP.replace_all(&out, "$1$2").into_owned();
    }

    out = ARTICLE_UNIT.replace_all(&out, "$1 1 $2").into_owned();

    out = NUMBER_WORDS
        .replace_all(&out, |caps: &Captures| {
            let value = match (caps.get(1), caps.get(2), caps.get(3)) {
                (Some(tens), unit, _) => {
                    tens_value(tens.as_str()).unwrap_or(0)
                        + unit.and_then(|u| unit_value(u.as_str())).unwrap_or(0)
                }
                (None, _, Some(unit)) => unit_value(unit.as_str()).unwrap_or(0),
                _ => return caps[0].to_string(),
            };
            value.to_string()
        })
        .into_owned();

    HALF_UNIT.replace_all(&out, "$1.5 $2").into_owned()
}
