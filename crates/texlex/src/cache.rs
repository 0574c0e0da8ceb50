//! Position-indexed caches of lexed tokens.
//!
//! A cache remembers the token that lexing produced when started at a given
//!     offset of the lexer's buffer.
//! Lexing is a pure function of the buffer contents from the start offset onward,
//!     so a cached token stays valid as long as that part of the buffer is unchanged.
//! When the buffer is edited, the entries after the edit are re-keyed
//!     and the entries overlapping the edit are dropped.
//!
//! Two implementations are provided: [NoCache], which caches nothing, and [SimpleCache],
//!     which is backed by a hash map.
//! Callers may provide their own implementation, e.g. one with bounded memory.

use crate::token::Token;
use std::collections::HashMap;

/// A position-indexed cache of tokens.
///
/// A cache owned by a [Lexer](crate::Lexer) must only be edited through the lexer's
///     own [insert](crate::Lexer::insert) and [remove](crate::Lexer::remove) methods.
/// Editing it directly breaks the consistency between the cache and the lexer's buffer.
pub trait LexerCache {
    /// Record that lexing starting at `position` yields `token`.
    ///
    /// Any prior entry at that position is overwritten.
    fn add(&mut self, position: usize, token: Token);

    /// Returns the token recorded for `position`, if any.
    fn get(&self, position: usize) -> Option<&Token>;

    /// Account for a contiguous run of tokens inserted at `position`.
    ///
    /// Every entry at or after `position` is moved forward by the total span length of the
    ///     inserted tokens, and the inserted tokens are then recorded at their own offsets.
    fn insert(&mut self, position: usize, tokens: &[Token]);

    /// Account for the removal of the range `[start, end)`.
    ///
    /// Entries in the range are deleted and entries at or after `end` are moved
    ///     back by `end - start`.
    fn remove(&mut self, start: usize, end: usize);

    /// Delete the entries in the range `[start, end)` without moving any other entry.
    ///
    /// This is for reclaiming memory; it is not a structural edit.
    fn evict(&mut self, start: usize, end: usize);

    /// Move every entry at or after `position` forward by `len`.
    fn shift(&mut self, position: usize, len: usize);

    /// Delete every entry that starts before `position` and whose token reaches `position`.
    ///
    /// Lexing a token inspects one character past its end,
    ///     so a token ending exactly at `position` is also deleted.
    fn invalidate(&mut self, position: usize);
}

impl<C: LexerCache + ?Sized> LexerCache for Box<C> {
    fn add(&mut self, position: usize, token: Token) {
        (**self).add(position, token)
    }
    fn get(&self, position: usize) -> Option<&Token> {
        (**self).get(position)
    }
    fn insert(&mut self, position: usize, tokens: &[Token]) {
        (**self).insert(position, tokens)
    }
    fn remove(&mut self, start: usize, end: usize) {
        (**self).remove(start, end)
    }
    fn evict(&mut self, start: usize, end: usize) {
        (**self).evict(start, end)
    }
    fn shift(&mut self, position: usize, len: usize) {
        (**self).shift(position, len)
    }
    fn invalidate(&mut self, position: usize) {
        (**self).invalidate(position)
    }
}

/// A cache that caches nothing.
///
/// This is the default for top-level lexers and is always used for the lexers of
///     nested regions.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl LexerCache for NoCache {
    fn add(&mut self, _: usize, _: Token) {}
    fn get(&self, _: usize) -> Option<&Token> {
        None
    }
    fn insert(&mut self, _: usize, _: &[Token]) {}
    fn remove(&mut self, _: usize, _: usize) {}
    fn evict(&mut self, _: usize, _: usize) {}
    fn shift(&mut self, _: usize, _: usize) {}
    fn invalidate(&mut self, _: usize) {}
}

/// A cache backed by a hash map from buffer offsets to tokens.
#[derive(Debug, Default, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimpleCache {
    entries: HashMap<usize, Token>,
}

impl SimpleCache {
    pub fn new() -> SimpleCache {
        Default::default()
    }

    /// Number of cached tokens.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The positions that have a cached token, in increasing order.
    pub fn positions(&self) -> Vec<usize> {
        let mut positions: Vec<usize> = self.entries.keys().copied().collect();
        positions.sort_unstable();
        positions
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Re-key every entry at or after `from` using `f`.
    ///
    /// The entries are taken out of the map before any is put back,
    ///     so that a moved entry never overwrites one that has yet to be moved.
    fn rekey<F: Fn(usize) -> usize>(&mut self, from: usize, f: F) -> usize {
        let keys: Vec<usize> = self
            .entries
            .keys()
            .copied()
            .filter(|k| *k >= from)
            .collect();
        let moved: Vec<(usize, Token)> = keys
            .into_iter()
            .filter_map(|k| self.entries.remove(&k).map(|token| (f(k), token)))
            .collect();
        let n = moved.len();
        self.entries.extend(moved);
        n
    }
}

impl LexerCache for SimpleCache {
    fn add(&mut self, position: usize, token: Token) {
        self.entries.insert(position, token);
    }

    fn get(&self, position: usize) -> Option<&Token> {
        self.entries.get(&position)
    }

    fn insert(&mut self, position: usize, tokens: &[Token]) {
        let total: usize = tokens.iter().map(Token::span_len).sum();
        self.shift(position, total);
        let mut p = position;
        for token in tokens {
            self.entries.insert(p, token.clone());
            p += token.span_len();
        }
    }

    fn remove(&mut self, start: usize, end: usize) {
        if end <= start {
            return;
        }
        self.evict(start, end);
        let len = end - start;
        let n = self.rekey(end, |k| k - len);
        tracing::debug!(start, end, moved = n, "moved cache entries after removal");
    }

    fn evict(&mut self, start: usize, end: usize) {
        let before = self.entries.len();
        self.entries.retain(|k, _| !(start..end).contains(k));
        tracing::trace!(
            start,
            end,
            evicted = before - self.entries.len(),
            "evicted cache entries"
        );
    }

    fn shift(&mut self, position: usize, len: usize) {
        if len == 0 {
            return;
        }
        let n = self.rekey(position, |k| k + len);
        tracing::debug!(position, len, moved = n, "moved cache entries after insertion");
    }

    fn invalidate(&mut self, position: usize) {
        let before = self.entries.len();
        self.entries
            .retain(|k, token| !(*k < position && *k + token.span_len() >= position));
        tracing::trace!(
            position,
            invalidated = before - self.entries.len(),
            "invalidated overlapping cache entries"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Content;

    fn content(s: &str) -> Token {
        Token::Content(Content::new(s))
    }

    fn cache_with(entries: &[(usize, &str)]) -> SimpleCache {
        let mut cache = SimpleCache::new();
        for (position, s) in entries {
            cache.add(*position, content(s));
        }
        cache
    }

    #[test]
    fn add_overwrites() {
        let mut cache = cache_with(&[(0, "a")]);
        cache.add(0, content("b"));
        assert_eq!(cache.get(0), Some(&content("b")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn no_cache_never_hits() {
        let mut cache = NoCache;
        cache.add(0, content("a"));
        assert_eq!(cache.get(0), None);
    }

    #[test]
    fn insert_shifts_later_entries() {
        let mut cache = cache_with(&[(0, "ab"), (2, "cd"), (4, "ef")]);
        cache.insert(2, &[content("xyz"), content("w")]);
        assert_eq!(cache.positions(), vec![0, 2, 5, 6, 8]);
        assert_eq!(cache.get(2), Some(&content("xyz")));
        assert_eq!(cache.get(5), Some(&content("w")));
        assert_eq!(cache.get(6), Some(&content("cd")));
        assert_eq!(cache.get(8), Some(&content("ef")));
    }

    #[test]
    fn shift_does_not_clobber_adjacent_entries() {
        let mut cache = cache_with(&[(1, "a"), (2, "b"), (3, "c")]);
        cache.shift(1, 1);
        assert_eq!(cache.positions(), vec![2, 3, 4]);
        assert_eq!(cache.get(2), Some(&content("a")));
        assert_eq!(cache.get(3), Some(&content("b")));
        assert_eq!(cache.get(4), Some(&content("c")));
    }

    #[test]
    fn remove_deletes_range_and_shifts_back() {
        let mut cache = cache_with(&[(0, "a"), (3, "b"), (5, "c"), (9, "d")]);
        cache.remove(3, 6);
        assert_eq!(cache.positions(), vec![0, 6]);
        assert_eq!(cache.get(6), Some(&content("d")));
    }

    #[test]
    fn remove_empty_range_is_a_no_op() {
        let mut cache = cache_with(&[(0, "a"), (3, "b")]);
        cache.remove(3, 3);
        assert_eq!(cache.positions(), vec![0, 3]);
    }

    #[test]
    fn evict_does_not_shift() {
        let mut cache = cache_with(&[(0, "a"), (3, "b"), (5, "c"), (9, "d")]);
        cache.evict(3, 6);
        assert_eq!(cache.positions(), vec![0, 9]);
    }

    #[test]
    fn invalidate_drops_overlapping_entries() {
        let mut cache = cache_with(&[(0, "ab"), (2, "cd"), (4, "e"), (7, "f")]);
        cache.invalidate(4);
        // "cd" ends exactly at 4 and so is dropped; "ab" ends before.
        assert_eq!(cache.positions(), vec![0, 4, 7]);
    }

    #[test]
    fn boxed_dyn_cache() {
        let mut cache: Box<dyn LexerCache> = Box::new(SimpleCache::new());
        cache.add(4, content("a"));
        cache.shift(0, 2);
        assert_eq!(cache.get(6), Some(&content("a")));
    }
}
