use super::model::TextChunk;
use once_cell::sync::Lazy;
use regex::Regex;

/// Sentence terminators followed by whitespace or end of text.
static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?…]+(?:\s+|$)").expect("sentence pattern must compile"));

/// Split normalized text into ordered chunks of at most `max_bytes` UTF-8 bytes.
///
/// Sentences are packed greedily; a sentence that alone exceeds the budget is
/// packed word by word instead, so boundaries never fall inside a word. A single
/// word larger than the budget is the only case that gets cut mid-word, on a
/// character boundary.
pub fn plan(text: &str, max_bytes: usize) -> Vec<TextChunk> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let max_bytes = max_bytes.max(1);
    if text.len() <= max_bytes {
        return vec![TextChunk {
            index: 0,
            text: text.to_string(),
        }];
    }

    let mut packer = Packer::new(max_bytes);
    for sentence in split_sentences(text) {
        if sentence.len() <= max_bytes {
            packer.push(&sentence);
        } else {
            for word in sentence.split(' ') {
                if word.len() <= max_bytes {
                    packer.push(word);
                } else {
                    for piece in split_word(word, max_bytes) {
                        packer.push(piece);
                    }
                }
            }
        }
    }

    packer.finish()
}

/// Sentences with internal whitespace collapsed to single spaces.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut last_end = 0;

    for mat in SENTENCE_END.find_iter(text) {
        push_sentence(&mut sentences, &text[last_end..mat.end()]);
        last_end = mat.end();
    }
    if last_end < text.len() {
        push_sentence(&mut sentences, &text[last_end..]);
    }

    sentences
}

fn push_sentence(sentences: &mut Vec<String>, raw: &str) {
    let sentence = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if !sentence.is_empty() {
        sentences.push(sentence);
    }
}

/// Cuts an oversized word on character boundaries. A character wider than
/// `max_bytes` is emitted alone.
fn split_word(word: &str, max_bytes: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;

    for (i, c) in word.char_indices() {
        let end = i + c.len_utf8();
        if end - start > max_bytes && i > start {
            pieces.push(&word[start..i]);
            start = i;
        }
    }
    if start < word.len() {
        pieces.push(&word[start..]);
    }

    pieces
}

struct Packer {
    max_bytes: usize,
    current: String,
    chunks: Vec<TextChunk>,
}

impl Packer {
    fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            current: String::new(),
            chunks: Vec::new(),
        }
    }

    fn push(&mut self, unit: &str) {
        if unit.is_empty() {
            return;
        }
        if !self.current.is_empty() && self.current.len() + unit.len() + 1 > self.max_bytes {
            self.flush();
        }
        if !self.current.is_empty() {
            self.current.push(' ');
        }
        self.current.push_str(unit);
    }

    fn flush(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let index = self.chunks.len();
        self.chunks.push(TextChunk {
            index,
            text: std::mem::take(&mut self.current),
        });
    }

    fn finish(mut self) -> Vec<TextChunk> {
        self.flush();
        self.chunks
    }
}
