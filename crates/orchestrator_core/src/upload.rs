/// File types the upload endpoint accepts.
pub const ALLOWED_EXTENSIONS: [&str; 5] = [".pdf", ".doc", ".docx", ".txt", ".md"];

/// Lower-cased text after the last dot, with the dot. A name without a dot is
/// its own extension (`"README"` -> `".readme"`).
pub fn file_extension(file_name: &str) -> String {
    let tail = file_name.rsplit('.').next().unwrap_or(file_name);
    format!(".{}", tail.to_lowercase())
}

pub fn is_supported_upload(file_name: &str) -> bool {
    let extension = file_extension(file_name);
    ALLOWED_EXTENSIONS.contains(&extension.as_str())
}

pub(crate) fn unsupported_notice() -> String {
    format!(
        "File type not supported. Please upload: {}",
        ALLOWED_EXTENSIONS.join(", ")
    )
}
