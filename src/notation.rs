//! Scanner for the die group notation `[amount]d[sides][l[n]][h[n]]`.
//!
//! The scanner works on already normalized input (see [`normalize`]), so it only
//! ever sees lowercase characters and no whitespace.

use std::ops::Range;


/// Normalizes a raw pattern: strips every whitespace character, lowercases
/// and expands the `d%` shorthand into `d100`.
///
/// # Examples
/// ```
/// use xdice::normalize;
///
/// assert_eq!(normalize(" 2D% + 1d6 "), "2d100+1d6");
/// ```
pub fn normalize(input: &str) -> String {
    input.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect::<String>()
        .replace("d%", "d100")
}


/// Raw pieces of a die group found in a normalized string.
///
/// Every field borrows the digits exactly as written; an empty string means the
/// digits were omitted. `lowest` and `highest` are `None` when the `l` / `h`
/// marker itself is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DiceMatch<'a> {
    pub span: Range<usize>,
    pub amount: &'a str,
    pub sides: &'a str,
    pub lowest: Option<&'a str>,
    pub highest: Option<&'a str>,
}

#[cfg(test)]
impl DiceMatch<'_> {
    pub fn as_str<'s>(&self, source: &'s str) -> &'s str {
        &source[self.span.clone()]
    }
}


/// Tries to match a die group starting exactly at byte `start` of `source`.
///
/// Digits before the `d` are consumed greedily, so `"12d6"` scanned from `0`
/// matches the whole string while scanned from `1` it matches `"2d6"`.
pub(crate) fn match_at(source: &str, start: usize) -> Option<DiceMatch<'_>> {
    let bytes = source.as_bytes();

    let amount_end = skip_digits(bytes, start);
    if bytes.get(amount_end) != Some(&b'd') {
        return None;
    }

    let sides_start = amount_end + 1;
    let sides_end = skip_digits(bytes, sides_start);
    let mut position = sides_end;

    let lowest = marker(source, b'l', &mut position);
    let highest = marker(source, b'h', &mut position);

    Some(DiceMatch {
        span: start..position,
        amount: &source[start..amount_end],
        sides: &source[sides_start..sides_end],
        lowest,
        highest,
    })
}


/// Finds every die group of `source`, left to right, without overlap.
pub(crate) fn find_all(source: &str) -> Vec<DiceMatch<'_>> {
    let mut matches = Vec::new();
    let mut position = 0;

    while position < source.len() {
        match match_at(source, position) {
            Some(found) => {
                position = found.span.end;
                matches.push(found);
            },
            None => position += 1
        }
    }

    matches
}


fn marker<'a>(source: &'a str, tag: u8, position: &mut usize) -> Option<&'a str> {
    let bytes = source.as_bytes();
    if bytes.get(*position) != Some(&tag) {
        return None;
    }

    let digits_start = *position + 1;
    let digits_end = skip_digits(bytes, digits_start);
    *position = digits_end;

    Some(&source[digits_start..digits_end])
}

fn skip_digits(bytes: &[u8], mut position: usize) -> usize {
    while position < bytes.len() && bytes[position].is_ascii_digit() {
        position += 1;
    }
    position
}
