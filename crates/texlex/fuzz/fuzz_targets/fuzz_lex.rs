#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|source: &str| {
    let mut lexer = texlex::Lexer::new(source);
    let tokens = match lexer.read_to_end() {
        Ok(tokens) => tokens,
        Err(err) => {
            assert!(err.span.start <= lexer.len(), "error span {:?} out of range", err.span);
            return;
        }
    };
    let literals: String = tokens.iter().map(texlex::Token::literal).collect();
    similar_asserts::assert_eq!(lexed: literals, buffer: lexer.buffer());
    let advanced: usize = tokens.iter().map(texlex::Token::span_len).sum();
    assert_eq!(advanced, lexer.len());
});
