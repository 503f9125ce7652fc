use unicode_segmentation::UnicodeSegmentation;

pub const CHALLENGE_ICONS: [&str; 18] = [
    "🏃‍♂️", "📚", "💧", "🧘‍♀️", "🌙", "🥗", "💪", "🎯", "🎵", "✍️", "🌱", "✨", "🛌", "🔥", "💡",
    "🧹", "🌞", "⭐",
];

/// Preset lengths offered by the challenge form, in days.
pub const CHALLENGE_DURATIONS: [u32; 4] = [7, 14, 21, 30];

pub const DEFAULT_CHALLENGE_DAYS: u32 = 7;
pub const DEFAULT_CHALLENGE_ICON: &str = CHALLENGE_ICONS[0];

pub const MAX_CHALLENGE_DAYS: u32 = 365;

/// `challenges.title` is a VARCHAR(20); the limit counts what the user sees.
pub const MAX_TITLE_GRAPHEMES: usize = 20;

/// Length in user-perceived characters, so a ZWJ emoji sequence counts once.
pub fn grapheme_len(s: &str) -> usize {
    s.graphemes(true).count()
}

pub fn is_preset_duration(days: u32) -> bool {
    CHALLENGE_DURATIONS.contains(&days)
}
