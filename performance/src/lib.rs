use rand::prelude::Distribution;
use rand::Rng;
use texlex::{Lexer, LexerCache};

static RANDOM_COMMAND_NAMES: [&str; 16] = [
    "textbf", "emph", "section", "label", "ref", "cite", "alpha", "beta", "frac", "sqrt",
    "item", "includegraphics", "hspace", "mathbb", "left", "right",
];

static RANDOM_ESCAPES: [&str; 6] = [r"\%", r"\&", r"\$", r"\#", r"\{", r"\}"];

/// Relative frequencies of the constructs in a generated document.
pub struct Weights {
    pub word: u32,
    pub space: u32,
    pub escape: u32,
    pub command: u32,
    pub group: u32,
    pub math: u32,
    pub comment: u32,
    pub alignment: u32,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            word: 200,
            space: 150,
            escape: 5,
            command: 60,
            group: 10,
            math: 20,
            comment: 5,
            alignment: 5,
        }
    }
}

/// Generate a random, well-formed LaTeX document.
///
/// The document consists of paragraphs separated by blank lines.
/// Every group, argument and math region in the document is closed.
pub fn generate_random_latex_document(
    rng: &mut rand::prelude::StdRng,
    num_bytes: usize,
    paragraph_length_bounds: (usize, usize),
    weights: &Weights,
) -> String {
    let mut result = String::with_capacity(num_bytes + 1000);
    result.push_str("% This LaTeX document was randomly generated.\n");
    result.push_str("\\documentclass[12pt]{article}\n\\begin{document}\n");
    while result.len() < num_bytes {
        let paragraph_length = if paragraph_length_bounds.1 <= paragraph_length_bounds.0 {
            paragraph_length_bounds.1
        } else {
            rng.gen_range(paragraph_length_bounds.0..paragraph_length_bounds.1 + 1)
        };
        generate_random_paragraph(rng, &mut result, paragraph_length, 0, weights);
        result.push_str("\n\n");
    }
    result.push_str("\\end{document}\n");
    result
}

fn generate_random_paragraph(
    rng: &mut rand::prelude::StdRng,
    result: &mut String,
    num_items: usize,
    depth: usize,
    weights: &Weights,
) {
    let dist = rand::distributions::WeightedIndex::new([
        weights.word,
        weights.space,
        weights.escape,
        weights.command,
        weights.group,
        weights.math,
        weights.comment,
        weights.alignment,
    ])
    .unwrap();
    for _ in 0..num_items {
        match dist.sample(rng) {
            0 => {
                for _ in 0..rng.gen_range(1..10) {
                    result.push(char::from_u32(97 + rng.gen_range(0..26)).unwrap());
                }
            }
            1 => {
                result.push(' ');
            }
            2 => {
                result.push_str(RANDOM_ESCAPES[rng.gen_range(0..RANDOM_ESCAPES.len())]);
            }
            3 => {
                result.push('\\');
                result.push_str(RANDOM_COMMAND_NAMES[rng.gen_range(0..RANDOM_COMMAND_NAMES.len())]);
                if rng.gen_range(0..4) == 0 {
                    result.push_str("[width=3cm, angle=90]");
                }
                if depth < 3 && rng.gen_range(0..2) == 0 {
                    let num_items = rng.gen_range(1..8);
                    result.push('{');
                    generate_random_paragraph(rng, result, num_items, depth + 1, weights);
                    result.push('}');
                } else {
                    // Keeps a following word out of the command name.
                    result.push(' ');
                }
            }
            4 if depth < 3 => {
                let num_items = rng.gen_range(1..8);
                result.push('{');
                generate_random_paragraph(rng, result, num_items, depth + 1, weights);
                result.push('}');
            }
            5 => {
                result.push_str(match rng.gen_range(0..4) {
                    0 => r"$x^2 + y_{i}$",
                    1 => r"\[ \frac{a}{b} \]",
                    2 => r"$\alpha_1$",
                    _ => r"$$\sum_{n=1}^{\infty} n$$",
                });
            }
            6 if depth == 0 => {
                result.push_str("% a comment {with a brace\n");
            }
            7 => {
                result.push_str(" & ");
            }
            _ => {}
        }
    }
}

/// Offsets of the top-level tokens of the document, lexed from the start.
pub fn token_boundaries<C: LexerCache>(
    lexer: &mut Lexer<C>,
) -> Result<Vec<usize>, texlex::Error> {
    lexer.seek(0);
    let mut boundaries = vec![];
    let mut position = 0;
    for token in lexer.tokens() {
        boundaries.push(position);
        position += token?.span_len();
    }
    Ok(boundaries)
}

/// Simulate typing in an editor.
///
/// Each edit inserts a word at a random token boundary, lexes the document from there
///     to the end and then removes the word again.
/// Returns the number of tokens lexed.
pub fn type_and_relex<C: LexerCache>(
    lexer: &mut Lexer<C>,
    boundaries: &[usize],
    rng: &mut rand::prelude::StdRng,
    num_edits: usize,
) -> Result<usize, texlex::Error> {
    const WORD: &str = "word ";
    if boundaries.is_empty() {
        return Ok(0);
    }
    let mut num_tokens = 0;
    for _ in 0..num_edits {
        let position = boundaries[rng.gen_range(0..boundaries.len())] as isize;
        lexer.insert(position, WORD);
        lexer.seek(position);
        for token in lexer.tokens() {
            token?;
            num_tokens += 1;
        }
        lexer.remove(position, position + WORD.len() as isize);
    }
    Ok(num_tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use texlex::{NoCache, SimpleCache};

    #[test]
    fn editing_restores_the_document() {
        let mut rng = rand::prelude::StdRng::seed_from_u64(23);
        let document = generate_random_latex_document(&mut rng, 20_000, (10, 60), &Default::default());

        let mut uncached = Lexer::with_cache(&document, NoCache);
        let mut cached = Lexer::with_cache(&document, SimpleCache::new());
        let boundaries = token_boundaries(&mut cached).unwrap();
        assert_eq!(token_boundaries(&mut uncached).unwrap(), boundaries);

        let mut rng = rand::prelude::StdRng::seed_from_u64(29);
        let want = type_and_relex(&mut uncached, &boundaries, &mut rng, 100).unwrap();
        let mut rng = rand::prelude::StdRng::seed_from_u64(29);
        let got = type_and_relex(&mut cached, &boundaries, &mut rng, 100).unwrap();
        assert_eq!(got, want);
        assert_eq!(cached.buffer(), uncached.buffer());
        assert_eq!(cached.buffer(), Lexer::new(&document).buffer());
    }

    #[test]
    fn generated_documents_lex() {
        let mut rng = rand::prelude::StdRng::seed_from_u64(17);
        let document = generate_random_latex_document(&mut rng, 50_000, (10, 60), &Default::default());
        let tokens = texlex::Lexer::new(&document).read_to_end().unwrap();
        assert!(!tokens.is_empty());
    }
}
