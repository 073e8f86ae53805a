//! Classification of control-endpoint status lines.
//!
//! The control server replies with free-text Russian status lines. The
//! substring heuristic below is a best-effort presentation aid, not part of
//! the wire contract; it is kept in one place so a tightened format only
//! touches this function.

/// Presentation class of a status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    /// The command was applied
    Success,
    /// The server rejected the command
    Error,
    /// Anything else
    Info,
}

const ERROR_MARKERS: [&str; 2] = ["ошибка", "неизвестная"];
const SUCCESS_MARKERS: [&str; 4] = ["установлено", "изменено", "запущен", "сохранён"];

/// Classify one status line by its substrings, case-insensitively
pub fn classify(text: &str) -> StatusKind {
    let lowered = text.to_lowercase();
    if ERROR_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        StatusKind::Error
    } else if SUCCESS_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        StatusKind::Success
    } else {
        StatusKind::Info
    }
}
