/// Local file name for a downloaded form: the last path segment of `url`,
/// made filesystem-safe, with an extension guessed from `content_type` when
/// the segment has none.
pub fn form_filename(url: &str, content_type: Option<&str>) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path
        .rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or("form");
    let mut name = sanitize(segment);
    if !name.contains('.') {
        if let Some(extension) = content_type.and_then(extension_for) {
            name.push('.');
            name.push_str(extension);
        }
    }
    name
}

fn extension_for(content_type: &str) -> Option<&'static str> {
    let essence = content_type.split(';').next().unwrap_or(content_type).trim();
    mime_guess::get_mime_extensions_str(essence)
        .and_then(|extensions| extensions.first())
        .copied()
}

fn sanitize(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let mut cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]).to_string();
    if cleaned.is_empty() {
        cleaned = "form".to_string();
    }
    if cleaned.len() > 80 {
        let mut cut = 80;
        while !cleaned.is_char_boundary(cut) {
            cut -= 1;
        }
        cleaned.truncate(cut);
    }
    if is_reserved_windows_name(&cleaned) {
        cleaned.push('_');
    }
    cleaned
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::form_filename;

    #[test]
    fn uses_last_segment_and_content_type() {
        assert_eq!(
            form_filename("/download/leave_request_form", Some("application/pdf")),
            "leave_request_form.pdf"
        );
        assert_eq!(
            form_filename("/download/leave.docx?v=2", Some("application/pdf")),
            "leave.docx"
        );
        assert_eq!(form_filename("/download/", None), "download");
        assert_eq!(form_filename("", None), "form");
        assert_eq!(form_filename("/forms/CON", None), "CON_");
    }
}
