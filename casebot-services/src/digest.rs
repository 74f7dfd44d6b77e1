//! Telegram digest rendering
//!
//! Output uses only the `b`, `i`, `a` and `code` tags of Telegram's HTML
//! parse mode. Every interpolated value is escaped.

use html_escape::{encode_double_quoted_attribute, encode_text};

use casebot_core::{ExtractedCase, MAX_DIFFICULTY, MIN_DIFFICULTY};

const HEADER: &str = "🔥 <b>КЕЙСЫ ЗАРАБОТКА: AI МОНЕТИЗАЦИЯ</b>";
const INTRO: &str = "Свежие реальные кейсы заработка на AI за последние сутки:";
const SEPARATOR: &str = "━━━━━━━━━━━━━━━";
const HASHTAGS: &str = "#AI #заработок #кейсы #монетизация";

const FILLED: char = '▓';
const EMPTY: char = '░';

/// Visual difficulty bar, e.g. `▓▓▓░░░░░░░ 3/10`.
pub fn difficulty_bar(score: u8) -> String {
    let filled = score.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY) as usize;
    let empty = MAX_DIFFICULTY as usize - filled;
    format!(
        "{}{} {}/{}",
        FILLED.to_string().repeat(filled),
        EMPTY.to_string().repeat(empty),
        filled,
        MAX_DIFFICULTY
    )
}

/// Render the run digest. Empty input renders to an empty string and must
/// not be sent.
pub fn render_digest(cases: &[ExtractedCase]) -> String {
    if cases.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    out.push_str(HEADER);
    out.push_str("\n\n");
    out.push_str(INTRO);
    out.push_str("\n\n");

    for case in cases {
        out.push_str(&render_case(case));
        out.push('\n');
    }

    out.push_str(SEPARATOR);
    out.push('\n');
    out.push_str(HASHTAGS);
    out
}

fn render_case(case: &ExtractedCase) -> String {
    format!(
        "🚀 <b>Кейс: {title}</b>\n\
         💰 Профит: <i>{profit}</i>\n\
         📊 Сложность: {bar}\n\
         🛠 Стек: <code>{stack}</code>\n\
         📍 <a href=\"{url}\">Источник</a>\n",
        title = encode_text(&case.title),
        profit = encode_text(&case.profit_description),
        bar = difficulty_bar(case.difficulty_score),
        stack = encode_text(&case.stack),
        url = encode_double_quoted_attribute(&case.origin_url),
    )
}
