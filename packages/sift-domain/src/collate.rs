//! Locale-aware string ordering for sort keys.
//!
//! Strings are compared in three passes over their canonical decomposition: base characters
//! ignoring case and accents, then accents, then case with lowercase first. Remaining ties
//! fall back to code point order so the result is a total order.
//!
//! The first pass weighs whitespace, punctuation and symbols below digits, and digits below
//! letters.

use std::cmp::Ordering;

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

pub fn locale_compare(left: &str, right: &str) -> Ordering {
	base_letters(left)
		.cmp(base_letters(right))
		.then_with(|| accented_letters(left).cmp(accented_letters(right)))
		.then_with(|| case_pattern(left).cmp(case_pattern(right)))
		.then_with(|| left.cmp(right))
}

fn base_letters(text: &str) -> impl Iterator<Item = (u8, char)> + '_ {
	text.nfd().filter(|ch| !is_combining_mark(*ch)).flat_map(char::to_lowercase).map(primary)
}

fn primary(ch: char) -> (u8, char) {
	let class = if ch.is_alphabetic() {
		2
	} else if ch.is_numeric() {
		1
	} else {
		0
	};

	(class, ch)
}

fn accented_letters(text: &str) -> impl Iterator<Item = char> + '_ {
	text.nfd().flat_map(char::to_lowercase)
}

fn case_pattern(text: &str) -> impl Iterator<Item = bool> + '_ {
	text.nfd().filter(|ch| !is_combining_mark(*ch)).map(char::is_uppercase)
}
