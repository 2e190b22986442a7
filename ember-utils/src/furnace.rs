/// Convert a raw furnace level into its in-game display label.
///
/// Levels 31-34 are the pre-Fire-Crystal band, 35-84 are the ten Fire
/// Crystal stages with four sub-stages each. Anything outside the mapped
/// range falls back to the decimal number.
pub fn furnace_display(level: i64) -> String {
    match level {
        31..=34 => format!("30-{}", level - 30),
        35..=84 => {
            let offset = level - 35;
            let stage = offset / 5 + 1;
            let sub_stage = offset % 5;
            if sub_stage == 0 {
                format!("FC {}", stage)
            } else {
                format!("FC {} - {}", stage, sub_stage)
            }
        }
        other => other.to_string(),
    }
}

/// Display text for a possibly-unknown furnace level.
pub fn furnace_text(level: Option<i64>) -> String {
    match level {
        Some(level) => furnace_display(level),
        None => "Unknown".to_owned(),
    }
}
