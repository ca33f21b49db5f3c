//! Numeric-aware text collation.
//!
//! Comparison runs in levels, each consulted only on a tie:
//! 1. primary: letters case-folded, `ё` equal to `е`, ASCII digit runs
//!    compared by numeric value, punctuation before digits before letters,
//!    and the locale's own script ahead of the other one;
//! 2. secondary: `е` before `ё`;
//! 3. tertiary: lowercase before uppercase;
//! 4. raw code-point order, so distinct strings never compare equal.

use crate::view::row::DisplayLocale;
use std::cmp::Ordering;

const GROUP_PUNCTUATION: u8 = 0;
const GROUP_DIGIT: u8 = 1;
const GROUP_OTHER_LETTER: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Script {
    Latin,
    Cyrillic,
    Other,
}

/// Compares two display strings under `locale`.
pub fn collate(left: &str, right: &str, locale: DisplayLocale) -> Ordering {
    primary_order(left, right, locale)
        .then_with(|| secondary_order(left, right))
        .then_with(|| tertiary_order(left, right))
        .then_with(|| left.cmp(right))
}

fn primary_order(left: &str, right: &str, locale: DisplayLocale) -> Ordering {
    let left: Vec<char> = left.chars().collect();
    let right: Vec<char> = right.chars().collect();
    let (mut i, mut j) = (0, 0);

    while i < left.len() && j < right.len() {
        if left[i].is_ascii_digit() && right[j].is_ascii_digit() {
            let left_run = digit_run(&left[i..]);
            let right_run = digit_run(&right[j..]);
            let ord = compare_numeric(left_run, right_run);
            if ord != Ordering::Equal {
                return ord;
            }
            i += left_run.len();
            j += right_run.len();
            continue;
        }

        let ord = primary_key(left[i], locale).cmp(&primary_key(right[j], locale));
        if ord != Ordering::Equal {
            return ord;
        }
        i += 1;
        j += 1;
    }

    (left.len() - i).cmp(&(right.len() - j))
}

fn secondary_order(left: &str, right: &str) -> Ordering {
    let accents = |value: &str| {
        value
            .chars()
            .filter(|c| c.is_alphabetic())
            .map(|c| fold_letter(c).1)
            .collect::<Vec<_>>()
    };
    accents(left).cmp(&accents(right))
}

fn tertiary_order(left: &str, right: &str) -> Ordering {
    left.chars()
        .map(char::is_uppercase)
        .cmp(right.chars().map(char::is_uppercase))
}

fn digit_run(chars: &[char]) -> &[char] {
    let len = chars.iter().take_while(|c| c.is_ascii_digit()).count();
    &chars[..len]
}

fn compare_numeric(left: &[char], right: &[char]) -> Ordering {
    let strip = |digits: &[char]| -> usize { digits.iter().take_while(|c| **c == '0').count() };
    let left = &left[strip(left)..];
    let right = &right[strip(right)..];
    left.len().cmp(&right.len()).then_with(|| left.cmp(right))
}

fn primary_key(c: char, locale: DisplayLocale) -> (u8, u32) {
    if c.is_ascii_digit() {
        return (GROUP_DIGIT, c as u32);
    }
    if !c.is_alphabetic() {
        return (GROUP_PUNCTUATION, c as u32);
    }

    let (base, _) = fold_letter(c);
    let group = match (script_of(base), locale) {
        (Script::Latin, DisplayLocale::En) | (Script::Cyrillic, DisplayLocale::Ru) => 2,
        (Script::Latin, DisplayLocale::Ru) | (Script::Cyrillic, DisplayLocale::En) => 3,
        (Script::Other, _) => GROUP_OTHER_LETTER,
    };
    (group, base as u32)
}

/// Lowercases `c` and splits off the accent this collation knows about.
fn fold_letter(c: char) -> (char, bool) {
    let lower = c.to_lowercase().next().unwrap_or(c);
    match lower {
        'ё' => ('е', true),
        other => (other, false),
    }
}

fn script_of(c: char) -> Script {
    match c {
        'a'..='z' | '\u{00C0}'..='\u{024F}' => Script::Latin,
        '\u{0400}'..='\u{04FF}' => Script::Cyrillic,
        _ => Script::Other,
    }
}
