/// Offset from `'A'` to REGIONAL INDICATOR SYMBOL LETTER A.
const REGIONAL_INDICATOR_OFFSET: u32 = 0x1F1E6 - 'A' as u32;

/// The flag glyph for an ISO 3166-1 alpha-2 code.
///
/// A flag is the pair of regional indicator symbols spelling the code. Codes
/// that are not two ASCII letters have no flag and yield an empty string.
pub(crate) fn flag_emoji(code: &str) -> String {
    if code.len() != 2 || !code.bytes().all(|b| b.is_ascii_alphabetic()) {
        return String::new();
    }
    code.chars()
        .filter_map(|c| char::from_u32(c.to_ascii_uppercase() as u32 + REGIONAL_INDICATOR_OFFSET))
        .collect()
}
