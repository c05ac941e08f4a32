use chunkdex::ChunkRecord;

/// Split `text` into paragraph chunks.
///
/// Paragraphs are separated by blank lines and have their inner whitespace collapsed.
/// A paragraph with fewer than `min_words` words is merged into the one after it; a short
/// tail is merged into the previous chunk. Ids are `"{source_name}#{n}"`, so chunking the
/// same file twice yields the same ids.
pub fn chunk_text(
    source_name: &str,
    text: &str,
    min_words: usize,
    created_at: &str,
) -> Vec<ChunkRecord> {
    let mut bodies: Vec<String> = Vec::new();
    let mut pending = String::new();

    for paragraph in split_paragraphs(text) {
        if !pending.is_empty() {
            pending.push(' ');
        }
        pending.push_str(&paragraph);
        if pending.split_whitespace().count() >= min_words {
            bodies.push(std::mem::take(&mut pending));
        }
    }
    if !pending.is_empty() {
        match bodies.last_mut() {
            Some(last) => {
                last.push(' ');
                last.push_str(&pending);
            }
            None => bodies.push(pending),
        }
    }

    bodies
        .into_iter()
        .enumerate()
        .map(|(n, body)| {
            ChunkRecord::new(format!("{source_name}#{n}"), source_name, body, created_at)
        })
        .collect()
}

fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join(" "));
                current.clear();
            }
        } else {
            current.extend(line.split_whitespace());
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join(" "));
    }
    paragraphs
}

#[cfg(test)]
mod tests {
    use super::*;

    const TS: &str = "2024-01-01T00:00:00Z";

    #[test]
    fn splits_on_blank_lines() {
        let text = "first paragraph here\nwraps onto two lines\n\n\nsecond   paragraph\n";
        let chunks = chunk_text("doc.txt", text, 1, TS);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].id, "doc.txt#0");
        assert_eq!(chunks[0].text, "first paragraph here wraps onto two lines");
        assert_eq!(chunks[0].word_count, 7);
        assert_eq!(chunks[1].text, "second paragraph");
        assert_eq!(chunks[1].source_name, "doc.txt");
    }

    #[test]
    fn merges_short_paragraphs() {
        let text = "Title\n\nA real paragraph with enough words\n\nend";
        let chunks = chunk_text("notes.md", text, 4, TS);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Title A real paragraph with enough words end");
    }

    #[test]
    fn empty_input_has_no_chunks() {
        assert!(chunk_text("empty.txt", "\n \n\t\n", 1, TS).is_empty());
    }
}
