pub const KEYWORDS: &[&str] = &["pushc", "pushp", "pushb", "pop", "show", "exit"];

pub const MAX_CODE_POINT: u32 = 0x10FFFF;

pub const SURROGATE_START: u32 = 0xD800;

pub const SURROGATE_END: u32 = 0xDFFF;

/// Longest UTF-8 encoding of a single scalar value.
pub const MAX_SEQUENCE_LEN: usize = 4;

#[inline]
pub fn is_keyword(s: &str) -> bool {
    KEYWORDS.contains(&s)
}

#[inline]
pub fn is_surrogate(code: u32) -> bool {
    (SURROGATE_START..=SURROGATE_END).contains(&code)
}

/// Matches the C `isspace` set, so `\v` and `\f` separate tokens too.
#[inline]
pub fn is_separator(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r' | '\x0B' | '\x0C')
}
