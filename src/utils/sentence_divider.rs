const SENTENCE_ENDS: &[char] = &['.', '!', '?', '。', '！', '？', '\n'];
const CLAUSE_ENDS: &[char] = &[',', ';', ':', '，', '、', '；', '：'];

/// Split text into sentences, keeping the terminating punctuation.
pub fn split_sentences(text: &str) -> Vec<String> {
    split_after(text, SENTENCE_ENDS)
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Split text into chunks of at most `max_chars` characters, preferring
/// sentence boundaries, then clause punctuation, then whitespace.
/// Adjacent short pieces are packed back together.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut pieces = Vec::new();
    for sentence in split_sentences(text) {
        fit(&sentence, max_chars, 0, &mut pieces);
    }
    pack(pieces, max_chars)
}

fn split_after<'a>(text: &'a str, delimiters: &[char]) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for (idx, ch) in text.char_indices() {
        if delimiters.contains(&ch) {
            let end = idx + ch.len_utf8();
            parts.push(&text[start..end]);
            start = end;
        }
    }
    if start < text.len() {
        parts.push(&text[start..]);
    }
    parts
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn fit(piece: &str, max_chars: usize, level: u8, out: &mut Vec<String>) {
    let piece = piece.trim();
    if piece.is_empty() {
        return;
    }
    if char_len(piece) <= max_chars {
        out.push(piece.to_string());
        return;
    }
    match level {
        0 => {
            for part in split_after(piece, CLAUSE_ENDS) {
                fit(part, max_chars, 1, out);
            }
        }
        1 => {
            let words: Vec<&str> = piece.split_whitespace().collect();
            if words.len() > 1 {
                for word in words {
                    fit(word, max_chars, 2, out);
                }
            } else {
                fit(piece, max_chars, 2, out);
            }
        }
        _ => {
            let chars: Vec<char> = piece.chars().collect();
            for chunk in chars.chunks(max_chars) {
                out.push(chunk.iter().collect());
            }
        }
    }
}

fn pack(pieces: Vec<String>, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for piece in pieces {
        if current.is_empty() {
            current = piece;
        } else if char_len(&current) + 1 + char_len(&piece) <= max_chars {
            current.push(' ');
            current.push_str(&piece);
        } else {
            chunks.push(std::mem::replace(&mut current, piece));
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
