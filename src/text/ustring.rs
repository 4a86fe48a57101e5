use std::fmt;
use std::io::{self, Write};
use std::ops::{Add, AddAssign};
use std::str::FromStr;

use crate::error::Error;
use crate::utf8::{self, Utf8Error};

/// Append-mostly sequence of Unicode scalar values.
///
/// The buffer stores decoded `char`s, so it can never hold a partial
/// multi-byte sequence. `len` counts scalar values and `byte_len` the size of
/// the UTF-8 rendering; both are kept up to date on every mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UString {
    chars: Vec<char>,
    byte_len: usize,
}

impl UString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            chars: Vec::with_capacity(capacity),
            byte_len: 0,
        }
    }

    /// Validates `bytes` as a whole and builds a string from them.
    pub fn from_utf8(bytes: &[u8]) -> Result<Self, Error> {
        let chars = utf8::decode_all(bytes)?;
        Ok(chars.into_iter().collect())
    }

    pub fn is_valid_utf8(bytes: &[u8]) -> bool {
        utf8::decode_all(bytes).is_ok()
    }

    /// Number of scalar values.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Size of the UTF-8 rendering in bytes.
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn clear(&mut self) {
        self.chars.clear();
        self.byte_len = 0;
    }

    pub fn get(&self, index: usize) -> Option<char> {
        self.chars.get(index).copied()
    }

    pub fn at(&self, index: usize) -> Result<char, Error> {
        self.get(index)
            .ok_or_else(|| Error::out_of_range(index, self.len()))
    }

    pub fn last(&self) -> Option<char> {
        self.chars.last().copied()
    }

    pub fn push(&mut self, ch: char) {
        self.byte_len += utf8::encoded_len(ch);
        self.chars.push(ch);
    }

    pub fn push_str(&mut self, s: &str) {
        self.chars.reserve(s.chars().size_hint().0);
        for ch in s.chars() {
            self.push(ch);
        }
    }

    pub fn push_code_point(&mut self, code: u32) -> Result<char, Error> {
        let ch = utf8::scalar_from_code_point(code)?;
        self.push(ch);
        Ok(ch)
    }

    /// Appends the single scalar value encoded by `bytes`. Nothing is appended
    /// unless the whole sequence decodes to exactly one value.
    pub fn push_utf8(&mut self, bytes: &[u8]) -> Result<char, Utf8Error> {
        let ch = utf8::decode_scalar(bytes)?;
        self.push(ch);
        Ok(ch)
    }

    /// Appends every scalar value of `bytes`, or nothing if any sequence in it
    /// is malformed.
    pub fn extend_utf8(&mut self, bytes: &[u8]) -> Result<usize, Utf8Error> {
        let chars = utf8::decode_all(bytes)?;
        let count = chars.len();
        self.extend(chars);
        Ok(count)
    }

    pub fn pop(&mut self) -> Option<char> {
        let ch = self.chars.pop()?;
        self.byte_len -= utf8::encoded_len(ch);
        Some(ch)
    }

    pub fn chars(&self) -> std::iter::Copied<std::slice::Iter<'_, char>> {
        self.chars.iter().copied()
    }

    /// Scalar values the buffer can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.chars.capacity()
    }

    pub fn as_chars(&self) -> &[char] {
        &self.chars
    }

    pub fn to_utf8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.byte_len);
        for &ch in &self.chars {
            utf8::encode_into(ch, &mut out);
        }
        out
    }

    /// Writes the UTF-8 rendering to `writer` without a trailing newline.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.to_utf8())
    }
}

impl fmt::Display for UString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write as _;
        for &ch in &self.chars {
            f.write_char(ch)?;
        }
        Ok(())
    }
}

impl FromStr for UString {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl From<&str> for UString {
    fn from(s: &str) -> Self {
        let mut out = Self::with_capacity(s.len());
        out.push_str(s);
        out
    }
}

impl From<char> for UString {
    fn from(ch: char) -> Self {
        let mut out = Self::with_capacity(1);
        out.push(ch);
        out
    }
}

impl TryFrom<&[u8]> for UString {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::from_utf8(bytes)
    }
}

impl FromIterator<char> for UString {
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> Self {
        let mut out = Self::new();
        out.extend(iter);
        out
    }
}

impl Extend<char> for UString {
    fn extend<I: IntoIterator<Item = char>>(&mut self, iter: I) {
        for ch in iter {
            self.push(ch);
        }
    }
}

impl<'a> IntoIterator for &'a UString {
    type Item = char;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, char>>;

    fn into_iter(self) -> Self::IntoIter {
        self.chars()
    }
}

impl AddAssign<&UString> for UString {
    fn add_assign(&mut self, other: &UString) {
        self.chars.extend_from_slice(&other.chars);
        self.byte_len += other.byte_len;
    }
}

impl AddAssign<&str> for UString {
    fn add_assign(&mut self, other: &str) {
        self.push_str(other);
    }
}

impl Add<&UString> for UString {
    type Output = UString;

    fn add(mut self, other: &UString) -> UString {
        self += other;
        self
    }
}

impl Add<&str> for UString {
    type Output = UString;

    fn add(mut self, other: &str) -> UString {
        self += other;
        self
    }
}

impl PartialEq<str> for UString {
    fn eq(&self, other: &str) -> bool {
        self.chars().eq(other.chars())
    }
}

impl PartialEq<&str> for UString {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for UString {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for UString {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        Ok(Self::from(s.as_str()))
    }
}
