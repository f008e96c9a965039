/// Position within the records matching one search token
///
/// `cursor` counts the records that have been visited so far. While iterating
/// `cursor < total` holds; the set is exhausted once `cursor == total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultSet {
    total: usize,
    cursor: usize,
}

impl ResultSet {
    /// Creates a result set positioned before its first record
    pub fn new(total: usize) -> Self {
        Self { total, cursor: 0 }
    }

    /// 0-based index of the current record
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.total
    }

    /// Returns true if the current record is the last one of the set
    pub fn is_last(&self) -> bool {
        self.cursor + 1 == self.total
    }

    /// Moves past the current record
    ///
    /// Returns false without moving once the set is exhausted.
    pub fn advance(&mut self) -> bool {
        if self.is_exhausted() {
            return false;
        }
        self.cursor += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_set_starts_at_zero() {
        let set = ResultSet::new(3);
        assert_eq!(set.cursor(), 0);
        assert!(!set.is_exhausted());
        assert!(!set.is_last());
    }

    #[test]
    fn test_advance_until_exhausted() {
        let mut set = ResultSet::new(2);
        assert!(set.advance());
        assert!(set.is_last());
        assert!(set.advance());
        assert!(set.is_exhausted());
        assert_eq!(set.cursor(), 2);
        assert!(!set.advance());
        assert_eq!(set.cursor(), 2);
    }

    #[test]
    fn test_empty_set_is_exhausted() {
        let mut set = ResultSet::new(0);
        assert!(set.is_exhausted());
        assert!(!set.advance());
    }
}
