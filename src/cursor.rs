/// A seekable character stream over the parser input.
///
/// Every combinator brackets its attempt with [`Cursor::position`] and
/// [`Cursor::seek`], so both are O(1). The cursor also remembers the furthest
/// offset any read was attempted at, which is the only failure location the
/// engine reports.
#[derive(Debug, Clone)]
pub struct Cursor {
    chars: Vec<char>,
    index: usize,
    furthest: usize,
}

impl Cursor {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            index: 0,
            furthest: 0,
        }
    }

    /// Read the next character, or `None` at end of input.
    pub fn read_one(&mut self) -> Option<char> {
        self.furthest = self.furthest.max(self.index);
        let c = self.chars.get(self.index).copied()?;
        self.index += 1;
        Some(c)
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    pub fn is_at_end(&self) -> bool {
        self.index >= self.chars.len()
    }

    pub fn position(&self) -> usize {
        self.index
    }

    /// Move to an absolute offset. Offsets past the end clamp to the end.
    pub fn seek(&mut self, position: usize) {
        self.index = position.min(self.chars.len());
    }

    pub fn furthest(&self) -> usize {
        self.furthest
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// The unread input, for diagnostics.
    pub fn remaining(&self) -> String {
        self.chars[self.index..].iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_until_end() {
        let mut cursor = Cursor::new("ab");
        assert_eq!(cursor.read_one(), Some('a'));
        assert_eq!(cursor.read_one(), Some('b'));
        assert_eq!(cursor.read_one(), None);
        assert_eq!(cursor.read_one(), None);
        assert_eq!(cursor.position(), 2);
        assert!(cursor.is_at_end());
    }

    #[test]
    fn test_seek_and_remaining() {
        let mut cursor = Cursor::new("hello");
        cursor.seek(2);
        assert_eq!(cursor.remaining(), "llo");
        assert_eq!(cursor.peek(), Some('l'));
        cursor.seek(0);
        assert_eq!(cursor.remaining(), "hello");
    }

    #[test]
    fn test_seek_clamps_to_end() {
        let mut cursor = Cursor::new("abc");
        cursor.seek(42);
        assert_eq!(cursor.position(), 3);
        assert_eq!(cursor.remaining(), "");
    }

    #[test]
    fn test_furthest_survives_seek_back() {
        let mut cursor = Cursor::new("abcd");
        cursor.read_one();
        cursor.read_one();
        cursor.read_one();
        cursor.seek(0);
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.furthest(), 2);
    }

    #[test]
    fn test_multibyte_input() {
        let mut cursor = Cursor::new("äö");
        assert_eq!(cursor.len(), 2);
        assert_eq!(cursor.read_one(), Some('ä'));
        assert_eq!(cursor.position(), 1);
    }
}
