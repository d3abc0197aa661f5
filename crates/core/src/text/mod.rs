//! Agent reply post-processing
//!
//! The backend occasionally appends interactive choice blocks to agent
//! replies ("Выбор: ..." markers or lettered option lists). The desktop
//! client renders plain prose, so those blocks are stripped before
//! display and before anything is written to the local archive.

/// Markers that introduce an inline choice block
const CHOICE_MARKERS: [&str; 2] = ["Выбор:", "Choice:"];

/// Strip trailing choice UI from an agent reply.
///
/// Truncates at the earliest choice marker if one occurs, otherwise
/// drops a trailing block of lettered options (`A) ...`, `Б) ...`).
/// The result is always trimmed. Applying the function twice yields
/// the same output as applying it once.
pub fn clean_agent_reply(raw: &str) -> String {
    if let Some(pos) = earliest_marker(raw) {
        return raw[..pos].trim().to_string();
    }
    if let Some(pos) = option_block_start(raw) {
        return raw[..pos].trim().to_string();
    }
    raw.trim().to_string()
}

fn earliest_marker(text: &str) -> Option<usize> {
    CHOICE_MARKERS
        .iter()
        .filter_map(|marker| text.find(marker))
        .min()
}

/// Byte offset where a trailing run of lettered option lines begins,
/// or None if the text does not end in one. The block may start
/// mid-line after prose ("Ответ. A) foo").
fn option_block_start(text: &str) -> Option<usize> {
    let mut block_start: Option<usize> = None;
    let mut line_start = 0;
    for line in text.split_inclusive('\n') {
        let stripped = line.trim_start();
        let indent = line.len() - stripped.len();
        if is_option_line(stripped) {
            block_start.get_or_insert(line_start + indent);
        } else if let Some(offset) = mid_line_option(stripped) {
            block_start = Some(line_start + indent + offset);
        } else if !stripped.trim().is_empty() {
            block_start = None;
        }
        line_start += line.len();
    }
    block_start
}

/// Whether a (left-trimmed) line is a lettered option: a single
/// uppercase Latin or Cyrillic letter, `)`, then a space and text
fn is_option_line(line: &str) -> bool {
    let mut chars = line.char_indices();
    let Some((_, letter)) = chars.next() else {
        return false;
    };
    if !is_option_letter(letter) {
        return false;
    }
    let Some((_, paren)) = chars.next() else {
        return false;
    };
    if paren != ')' {
        return false;
    }
    matches!(chars.next(), Some((_, ' ')))
}

/// Byte offset of an option list that starts after prose on the same
/// line ("Ответ. A) foo"), or None
fn mid_line_option(line: &str) -> Option<usize> {
    let mut search_from = 0;
    while let Some(rel) = line[search_from..].find(") ") {
        let paren = search_from + rel;
        let prefix = &line[..paren];
        if let Some(letter) = prefix.chars().next_back() {
            if is_option_letter(letter) {
                let start = paren - letter.len_utf8();
                let before = line[..start].trim_end();
                if !before.is_empty() && is_option_line(&line[start..]) {
                    return Some(start);
                }
            }
        }
        search_from = paren + 1;
    }
    None
}

fn is_option_letter(c: char) -> bool {
    c.is_ascii_uppercase() || ('А'..='Я').contains(&c) || c == 'Ё'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_marker_truncates() {
        let raw = "Ты стоишь у развилки.\n\nВыбор: налево или направо?";
        assert_eq!(clean_agent_reply(raw), "Ты стоишь у развилки.");
        let raw = "You stand at a fork.\nChoice: left or right?";
        assert_eq!(clean_agent_reply(raw), "You stand at a fork.");
    }

    #[test]
    fn test_earliest_marker_wins() {
        let raw = "Intro. Choice: a\nВыбор: b";
        assert_eq!(clean_agent_reply(raw), "Intro.");
    }

    #[test]
    fn test_trailing_option_lines_stripped() {
        let raw = "Что будешь делать?\nA) Бежать\nB) Сражаться";
        assert_eq!(clean_agent_reply(raw), "Что будешь делать?");
    }

    #[test]
    fn test_cyrillic_option_letters() {
        let raw = "Выбирай.\nА) Да\nБ) Нет";
        assert_eq!(clean_agent_reply(raw), "Выбирай.");
    }

    #[test]
    fn test_mid_line_option_block() {
        let raw = "Ответ. A) foo\nB) bar";
        assert_eq!(clean_agent_reply(raw), "Ответ.");
    }

    #[test]
    fn test_options_in_middle_not_stripped() {
        let raw = "A) первая строка не вариант\nа продолжение рассказа";
        assert_eq!(clean_agent_reply(raw), raw.trim());
    }

    #[test]
    fn test_plain_reply_only_trimmed() {
        let raw = "  Обычный ответ без вариантов.  ";
        assert_eq!(clean_agent_reply(raw), "Обычный ответ без вариантов.");
    }

    #[test]
    fn test_idempotent() {
        for raw in [
            "Ты стоишь у развилки.\nВыбор: налево?",
            "Ответ. A) foo\nB) bar",
            "Просто текст.",
            "",
        ] {
            let once = clean_agent_reply(raw);
            assert_eq!(clean_agent_reply(&once), once);
        }
    }
}
