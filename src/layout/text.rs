/// Number of columns the title may use, derived from the measured glyph
/// width so that wrapping stays inside the canvas for any font.
pub(crate) fn wrap_columns(
    canvas_width: u32,
    margin: u32,
    glyph_width: u32,
    min_columns: usize,
) -> usize {
    let available = canvas_width.saturating_sub(margin);
    let columns = (available / glyph_width.max(1)) as usize;
    columns.max(min_columns).max(1)
}

/// Greedy word wrap by character count.
///
/// Words are only split when a single word is longer than `columns`. With
/// `break_on_hyphens`, compound words may also break after a hyphen.
pub(crate) fn wrap_text(text: &str, columns: usize, break_on_hyphens: bool) -> Vec<String> {
    let columns = columns.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let chunks = word_chunks(word, columns, break_on_hyphens);
        for (idx, chunk) in chunks.iter().enumerate() {
            let chunk_len = chunk.chars().count();
            let gap = usize::from(idx == 0 && current_len > 0);
            if current_len > 0 && current_len + gap + chunk_len > columns {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            } else if gap == 1 {
                current.push(' ');
                current_len += 1;
            }
            current.push_str(chunk);
            current_len += chunk_len;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn word_chunks(word: &str, columns: usize, break_on_hyphens: bool) -> Vec<String> {
    let pieces = if break_on_hyphens {
        split_after_hyphens(word)
    } else {
        vec![word.to_string()]
    };
    let mut chunks = Vec::new();
    for piece in pieces {
        let chars: Vec<char> = piece.chars().collect();
        if chars.len() <= columns {
            chunks.push(piece);
        } else {
            chunks.extend(chars.chunks(columns).map(|c| c.iter().collect::<String>()));
        }
    }
    chunks
}

/// `"2-methyl-propan"` becomes `["2-", "methyl-", "propan"]`. Leading,
/// trailing and doubled hyphens are not break points.
fn split_after_hyphens(word: &str) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    let mut pieces = Vec::new();
    let mut current = String::new();
    for (idx, ch) in chars.iter().enumerate() {
        current.push(*ch);
        let breakable = *ch == '-'
            && idx > 0
            && chars[idx - 1].is_alphanumeric()
            && chars.get(idx + 1).is_some_and(|next| next.is_alphanumeric());
        if breakable {
            pieces.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_follow_glyph_width() {
        assert_eq!(wrap_columns(300, 20, 14, 10), 20);
        assert_eq!(wrap_columns(300, 20, 7, 10), 40);
    }

    #[test]
    fn columns_never_drop_below_minimum() {
        assert_eq!(wrap_columns(300, 20, 100, 10), 10);
        assert_eq!(wrap_columns(10, 20, 14, 10), 10);
        assert_eq!(wrap_columns(300, 20, 0, 10), 280);
    }

    #[test]
    fn short_text_stays_on_one_line() {
        assert_eq!(wrap_text("Acetone", 20, true), vec!["Acetone"]);
    }

    #[test]
    fn greedy_fill_respects_columns() {
        let lines = wrap_text("Sodium hydroxide solution fifty percent", 16, true);
        assert_eq!(
            lines,
            vec!["Sodium hydroxide", "solution fifty", "percent"]
        );
        for line in &lines {
            assert!(line.chars().count() <= 16, "line too long: {line:?}");
        }
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(wrap_text("  Nitric \n\t acid ", 20, true), vec!["Nitric acid"]);
    }

    #[test]
    fn overlong_word_is_split_into_column_chunks() {
        let lines = wrap_text("Pneumonoultramicroscopic", 10, false);
        assert_eq!(lines, vec!["Pneumonoul", "tramicrosc", "opic"]);
    }

    #[test]
    fn hyphenated_names_break_after_hyphen() {
        let lines = wrap_text("2-methylpropan-1-ol", 14, true);
        assert_eq!(lines, vec!["2-", "methylpropan-", "1-ol"]);
        assert_eq!(wrap_text("2-methylpropan-1-ol", 20, false), vec!["2-methylpropan-1-ol"]);
    }

    #[test]
    fn hyphen_split_keeps_hyphen_on_first_piece() {
        assert_eq!(split_after_hyphens("2-methyl-propan"), vec!["2-", "methyl-", "propan"]);
        assert_eq!(split_after_hyphens("-x"), vec!["-x"]);
        assert_eq!(split_after_hyphens("a--b"), vec!["a--b"]);
    }

    #[test]
    fn empty_text_has_no_lines() {
        assert!(wrap_text("", 10, true).is_empty());
        assert!(wrap_text("   ", 10, true).is_empty());
    }
}
