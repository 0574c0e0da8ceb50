#![no_main]

use libfuzzer_sys::fuzz_target;
use texlex::{Lexer, LexerCache, SimpleCache};

#[derive(Debug, arbitrary::Arbitrary)]
enum Edit {
    Seek(i16),
    Insert(i16, String),
    Remove(i16, i16),
    Next,
    Peek(u8),
    ReadToEnd,
}

#[derive(Debug, arbitrary::Arbitrary)]
struct Input {
    source: String,
    edits: Vec<Edit>,
}

fn apply<C: LexerCache>(lexer: &mut Lexer<C>, edit: &Edit) -> String {
    match edit {
        Edit::Seek(p) => format!["{}", lexer.seek(*p as isize).cursor()],
        Edit::Insert(p, text) => format!["{}", lexer.insert(*p as isize, text).cursor()],
        Edit::Remove(a, b) => format!["{}", lexer.remove(*a as isize, *b as isize).cursor()],
        Edit::Next => format!["{:?}", lexer.next_token()],
        Edit::Peek(n) => format!["{:?}", lexer.peek_ahead(*n as usize)],
        Edit::ReadToEnd => format!["{:?}", lexer.read_to_end()],
    }
}

fuzz_target!(|input: Input| {
    let mut uncached = Lexer::new(&input.source);
    let mut cached = Lexer::with_cache(&input.source, SimpleCache::new());
    for edit in &input.edits {
        let want = apply(&mut uncached, edit);
        let got = apply(&mut cached, edit);
        similar_asserts::assert_eq!(cached: got, uncached: want);
    }
    similar_asserts::assert_eq!(cached: cached.buffer(), uncached: uncached.buffer());
});
