//! Character sets and glyph filename mapping.
//!
//! A [`CharacterSet`] is the ordered list of characters the template asks the
//! writer to fill in, cell by cell. The pipeline binds glyphs to characters
//! purely by position, so the order here must match the printed template.
//!
//! Filenames: most characters are used verbatim (`Á.png`), but a handful are
//! unsafe or awkward on common filesystems and get a descriptive ASCII name
//! instead (`/` → `slash.png`). Older runs used a longer list of descriptive
//! names; those are still recognised when mapping a filename back to its
//! character so `rename` can migrate them.

use crate::error::GlyphExtractorError;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::ops::Range;
use std::path::Path;

/// Characters per page in the default 8 × 10 layout.
pub const DEFAULT_PAGE_SIZE: usize = 80;

/// The default two-page layout: Czech alphabet, digits, punctuation, symbols.
#[rustfmt::skip]
pub const CZECH_CHARSET: [char; 160] = [
    // Page 1: uppercase, digits, punctuation
    'A', 'Á', 'B', 'C', 'Č', 'D', 'Ď', 'E',
    'É', 'Ě', 'F', 'G', 'H', 'I', 'Í', 'J',
    'K', 'L', 'M', 'N', 'Ň', 'O', 'Ó', 'P',
    'Q', 'R', 'Ř', 'S', 'Š', 'T', 'Ť', 'U',
    'Ú', 'Ů', 'V', 'W', 'X', 'Y', 'Ý', 'Z',
    'Ž', '0', '1', '2', '3', '4', '5', '6',
    '7', '8', '9', '.', ',', '!', '?', ':',
    ';', '-', '(', ')', '"', '\'', '/', '@',
    '#', '&', '+', '=', '%', '*', '€', '$',
    '[', ']', '{', '}', '<', '>', '\\', '_',
    // Page 2: lowercase, typographic and foreign symbols
    'a', 'á', 'b', 'c', 'č', 'd', 'ď', 'e',
    'é', 'ě', 'f', 'g', 'h', 'i', 'í', 'j',
    'k', 'l', 'm', 'n', 'ň', 'o', 'ó', 'p',
    'q', 'r', 'ř', 's', 'š', 't', 'ť', 'u',
    'ú', 'ů', 'v', 'w', 'x', 'y', 'ý', 'z',
    'ž', '~', '`', '^', '|', '©', '®', '™',
    '°', '§', '¶', '•', '…', '–', '—', '„',
    '\u{201C}', '‚', '\u{2019}', '«', '»', '×', '÷', '±',
    '¼', '½', '¾', '¹', '²', '³', 'µ', '¿',
    '¡', 'ñ', 'Ñ', 'ß', 'æ', 'Æ', 'ø', 'Ø',
];

/// Characters written under a descriptive name. Used in both directions.
const SAFE_NAMES: &[(char, &str)] = &[
    ('/', "slash"),
    ('\\', "backslash"),
    (':', "colon"),
    ('*', "asterisk"),
    ('?', "question"),
    ('"', "doublequote"),
    ('<', "less"),
    ('>', "greater"),
    ('|', "pipe"),
    ('.', "dot"),
    (',', "comma"),
    ('\'', "apostrophe"),
    (' ', "space"),
];

/// Descriptive names produced by earlier runs. Only read, never written.
const LEGACY_NAMES: &[(char, &str)] = &[
    ('!', "exclaim"),
    (';', "semicolon"),
    ('-', "hyphen"),
    ('_', "underscore"),
    ('@', "at"),
    ('#', "hash"),
    ('&', "ampersand"),
    ('+', "plus"),
    ('=', "equals"),
    ('%', "percent"),
    ('$', "dollar"),
    ('(', "lparen"),
    (')', "rparen"),
    ('[', "lbracket"),
    (']', "rbracket"),
    ('{', "lbrace"),
    ('}', "rbrace"),
    ('~', "tilde"),
    ('`', "backtick"),
    ('^', "caret"),
];

static CHAR_TO_NAME: Lazy<HashMap<char, &'static str>> =
    Lazy::new(|| SAFE_NAMES.iter().copied().collect());

static NAME_TO_CHAR: Lazy<HashMap<&'static str, char>> = Lazy::new(|| {
    SAFE_NAMES
        .iter()
        .chain(LEGACY_NAMES)
        .map(|&(c, name)| (name, c))
        .collect()
});

/// Filename stem (without `.png`) for a character.
pub fn char_to_filename(c: char) -> String {
    match CHAR_TO_NAME.get(&c) {
        Some(name) => (*name).to_string(),
        None => c.to_string(),
    }
}

/// Character for a filename stem. Unknown stems are returned verbatim,
/// which covers every character stored under its own name.
pub fn filename_to_char(stem: &str) -> String {
    match NAME_TO_CHAR.get(stem) {
        Some(c) => c.to_string(),
        None => stem.to_string(),
    }
}

/// Ordered, immutable list of characters expected in successive grid cells
/// across all pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterSet {
    chars: Vec<char>,
}

impl Default for CharacterSet {
    fn default() -> Self {
        Self::czech()
    }
}

impl CharacterSet {
    /// The built-in 160-character Czech layout.
    pub fn czech() -> Self {
        Self {
            chars: CZECH_CHARSET.to_vec(),
        }
    }

    pub fn new(chars: Vec<char>) -> Self {
        Self { chars }
    }

    /// Parse a character set from text: every character except line breaks
    /// is one entry, in reading order.
    pub fn parse(text: &str) -> Self {
        Self {
            chars: text.chars().filter(|c| *c != '\n' && *c != '\r').collect(),
        }
    }

    /// Load a character set from a UTF-8 text file, see [`CharacterSet::parse`].
    pub fn from_file(path: &Path) -> Result<Self, GlyphExtractorError> {
        let text =
            std::fs::read_to_string(path).map_err(|source| GlyphExtractorError::CharsetLoadFailed {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::parse(&text))
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<char> {
        self.chars.get(index).copied()
    }

    pub fn as_slice(&self) -> &[char] {
        &self.chars
    }

    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.chars.iter().copied()
    }

    /// Cursor positions covered by page `page_index` when every page holds
    /// `cells_per_page` cells, clamped to the set length.
    ///
    /// Lets pages be processed independently while keeping each glyph bound
    /// to the character its cell position implies.
    pub fn page_range(&self, page_index: usize, cells_per_page: usize) -> Range<usize> {
        let start = page_index.saturating_mul(cells_per_page).min(self.len());
        let end = start.saturating_add(cells_per_page).min(self.len());
        start..end
    }

    /// Characters printed on page `page_index`.
    pub fn page(&self, page_index: usize, cells_per_page: usize) -> &[char] {
        &self.chars[self.page_range(page_index, cells_per_page)]
    }

    /// Number of pages needed to hold every character.
    pub fn page_count(&self, cells_per_page: usize) -> usize {
        if cells_per_page == 0 {
            return 0;
        }
        self.len().div_ceil(cells_per_page)
    }
}
