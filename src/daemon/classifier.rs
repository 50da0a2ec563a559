/// Fragments of window titles that belong to applications counted as work.
pub const WORK_PROGRAMS: [&str; 15] = [
    "AutoCAD",
    "Revit",
    "ETABS",
    "SAFE",
    "Excel",
    "PowerPoint",
    "Word",
    "SketchUp",
    "Lumion",
    "Twinmotion",
    "3ds Max",
    "Archicad",
    "Chrome",
    "Edge",
    "Brave",
];

/// Whether the window title belongs to a recognized work application. Matching is a
/// case-insensitive substring search over [WORK_PROGRAMS].
pub fn is_work_app(window_title: &str) -> bool {
    if window_title.trim().is_empty() {
        return false;
    }
    let title = window_title.to_lowercase();
    WORK_PROGRAMS
        .iter()
        .any(|program| title.contains(&program.to_lowercase()))
}
