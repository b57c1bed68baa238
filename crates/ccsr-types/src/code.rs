//! ICD-10 code and CCSR category identifier types.
//!
//! Codes arrive in many spellings (`a00.0`, `A000 `, `'A000'`). Every lookup
//! in the reference index works on the normalized form produced by
//! [`Normalization::normalize`], and the same rules must be applied to the
//! reference table and to the queried codes.

/// A CCSR category identifier, such as `INF003` or `DIG001`.
///
/// # Examples
///
/// ```
/// use ccsr_types::CategoryId;
///
/// let category: CategoryId = "INF003".to_string();
/// assert_eq!(category.len(), 6);
/// ```
pub type CategoryId = String;

/// Minimum prefix length searched during hierarchical fallback.
///
/// Three characters keep the chapter letter plus two digits, the shortest
/// ICD-10 category that still carries clinical meaning.
pub const DEFAULT_MIN_PREFIX_LEN: usize = 3;

/// Rules used to bring a raw code into its canonical form.
///
/// # Examples
///
/// ```
/// use ccsr_types::Normalization;
///
/// let rules = Normalization::default();
/// assert_eq!(rules.normalize(" a00.1 "), "A001");
///
/// let keep_case = Normalization { uppercase: false, ..Default::default() };
/// assert_eq!(keep_case.normalize("a00.1"), "a001");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Normalization {
    /// Fold the code to ASCII uppercase.
    pub uppercase: bool,
    /// Remove every character that is not an ASCII letter or digit.
    pub strip_punctuation: bool,
}

impl Default for Normalization {
    fn default() -> Self {
        Self {
            uppercase: true,
            strip_punctuation: true,
        }
    }
}

impl Normalization {
    /// Returns the canonical form of `raw` under these rules.
    ///
    /// Surrounding whitespace is always trimmed. With punctuation stripping
    /// disabled, interior characters are kept as-is.
    pub fn normalize(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        let mut out = String::with_capacity(trimmed.len());
        for c in trimmed.chars() {
            if self.strip_punctuation && !c.is_ascii_alphanumeric() {
                continue;
            }
            if self.uppercase {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

/// Returns the leading `len` characters of a normalized code.
///
/// Returns `None` when the code is shorter than `len`. Works on character
/// boundaries so codes that kept non-ASCII punctuation never split a char.
pub fn code_prefix(code: &str, len: usize) -> Option<&str> {
    if len == 0 {
        return Some("");
    }
    match code.char_indices().nth(len) {
        Some((end, _)) => Some(&code[..end]),
        None if code.chars().count() == len => Some(code),
        None => None,
    }
}
