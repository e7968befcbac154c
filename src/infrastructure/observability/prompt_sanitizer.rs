const MAX_VISIBLE_LENGTH: usize = 100;

const SENSITIVE_PREFIXES: [&str; 5] = ["Api-Key ", "Bearer ", "api_key=", "token=", "secret="];

/// Shortens and redacts prompt text before it reaches the logs.
pub fn sanitize_prompt(prompt: &str) -> String {
    let trimmed = prompt.trim();

    if trimmed.is_empty() {
        return String::from("[EMPTY]");
    }

    let char_count = trimmed.chars().count();
    let visible = if char_count > MAX_VISIBLE_LENGTH {
        let head: String = trimmed.chars().take(MAX_VISIBLE_LENGTH).collect();
        format!("{}... ({} chars total)", head, char_count)
    } else {
        trimmed.to_string()
    };

    SENSITIVE_PREFIXES
        .iter()
        .fold(visible, |text, prefix| redact_after(&text, prefix))
}

fn redact_after(text: &str, prefix: &str) -> String {
    let Some(idx) = text.find(prefix) else {
        return text.to_string();
    };
    let value_start = idx + prefix.len();
    let value_end = text[value_start..]
        .find(|c: char| c.is_whitespace() || c == '&' || c == '"' || c == '\'')
        .map(|i| value_start + i)
        .unwrap_or(text.len());

    format!("{}[REDACTED]{}", &text[..value_start], &text[value_end..])
}
