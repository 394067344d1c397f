/// Reply formatting per output modality. The text channel returns the
/// completion untouched (markup-preserving); the voice channel strips
/// structural markdown so the narration reads as plain prose.
///
/// Stripping only removes delimiter tokens; it never rewrites words, so
/// applying it to already-plain text is a no-op.
pub fn strip_speech_markup(text: &str) -> String {
    let mut plain = String::with_capacity(text.len());

    for (i, line) in text.lines().enumerate() {
        if i > 0 {
            plain.push('\n');
        }
        let line = strip_heading_marker(line);
        let line = line
            .replace("**", "")
            .replace("__", "")
            .replace("~~", "")
            .replace('*', "")
            .replace('_', "")
            .replace('`', "");
        plain.push_str(&line);
    }
    if text.ends_with('\n') {
        plain.push('\n');
    }
    plain
}

fn strip_heading_marker(line: &str) -> &str {
    let trimmed = line.trim_start_matches('#');
    if trimmed.len() < line.len() {
        if let Some(rest) = trimmed.strip_prefix(' ') {
            return rest;
        }
    }
    line
}
