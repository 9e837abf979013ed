//! Fenced code block splitting.
//!
//! A line whose first non-blank characters are three backticks toggles the
//! fence state. The fence lines themselves belong to the code chunk. An
//! unclosed fence runs to the end of the text.

/// Contiguous slice of the input that is either prose or fenced code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub text: &'a str,
    /// Byte offset of `text` within the input.
    pub start: usize,
    pub is_code: bool,
}

pub fn is_fence_line(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

/// Splits `text` into alternating prose/code chunks covering the whole input.
pub fn split_fenced(text: &str) -> Vec<Chunk<'_>> {
    let mut chunks: Vec<Chunk<'_>> = Vec::new();
    let mut in_fence = false;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let is_fence = is_fence_line(line);
        let is_code = is_fence || in_fence;
        if is_fence {
            in_fence = !in_fence;
        }

        match chunks.last_mut() {
            Some(last) if last.is_code == is_code => {
                last.text = &text[last.start..offset + line.len()];
            }
            _ => chunks.push(Chunk {
                text: &text[offset..offset + line.len()],
                start: offset,
                is_code,
            }),
        }
        offset += line.len();
    }

    chunks
}
