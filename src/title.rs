/// Group title encoding: "<name>", "<name> ②" ... "<name> ⑩", "<name> (11)"
use std::collections::BTreeSet;

const CIRCLED_NUMBERS: [char; 10] = ['①', '②', '③', '④', '⑤', '⑥', '⑦', '⑧', '⑨', '⑩'];

/// Logical identity recovered from a group title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTitle {
    pub group_name: String,
    pub number: u32,
}

/// Title for the `number`-th group of `group_name`.
///
/// Number 1 is the bare name; 2..=10 use a circled digit and anything larger
/// falls back to a parenthesized number.
pub fn build_group_title(group_name: &str, number: u32) -> String {
    match number {
        0 | 1 => group_name.to_string(),
        2..=10 => format!("{} {}", group_name, CIRCLED_NUMBERS[number as usize - 1]),
        _ => format!("{} ({})", group_name, number),
    }
}

/// Inverse of [`build_group_title`]. A title without a number suffix is number 1.
pub fn parse_group_title(title: &str) -> ParsedTitle {
    if let Some((name, number)) = title
        .rsplit_once(' ')
        .and_then(|(name, suffix)| suffix_number(suffix).map(|n| (name, n)))
    {
        return ParsedTitle {
            group_name: name.to_string(),
            number,
        };
    }

    ParsedTitle {
        group_name: title.to_string(),
        number: 1,
    }
}

/// Number of `title` when it was built from `group_name`, if it was.
///
/// Unlike [`parse_group_title`] this also recognizes names that themselves
/// end in something that looks like a number suffix.
pub fn title_number_for(title: &str, group_name: &str) -> Option<u32> {
    let rest = title.strip_prefix(group_name)?;
    if rest.is_empty() {
        return Some(1);
    }
    suffix_number(rest.strip_prefix(' ')?)
}

/// True when `group_name` survives a build/parse round trip unchanged
pub fn is_plain_group_name(group_name: &str) -> bool {
    parse_group_title(group_name)
        == ParsedTitle {
            group_name: group_name.to_string(),
            number: 1,
        }
}

fn suffix_number(suffix: &str) -> Option<u32> {
    circled_number(suffix).or_else(|| parenthesized_number(suffix))
}

fn circled_number(suffix: &str) -> Option<u32> {
    let mut chars = suffix.chars();
    let glyph = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    let index = CIRCLED_NUMBERS.iter().position(|&c| c == glyph)?;
    // ① is only ever read, never written; bare name is number 1
    Some(index as u32 + 1)
}

fn parenthesized_number(suffix: &str) -> Option<u32> {
    let digits = suffix.strip_prefix('(')?.strip_suffix(')')?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    // Only numbers build_group_title would have written this way
    let number: u32 = digits.parse().ok()?;
    (number > 10 && digits == number.to_string()).then_some(number)
}

/// Smallest number >= 1 not already taken
pub fn smallest_unused_number(used: impl IntoIterator<Item = u32>) -> u32 {
    let used: BTreeSet<u32> = used.into_iter().collect();
    (1..).find(|n| !used.contains(n)).unwrap_or(1)
}
