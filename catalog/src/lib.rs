//! Static content shipped with the app: celebration copy, the milestone
//! sequence, challenge presets and the built-in sticker palette.
//!
//! Nothing here touches the store. The tracker seeds and reads from it.

pub mod challenge;
pub mod messages;
pub mod palettes;

pub use challenge::{
    grapheme_len, is_preset_duration, CHALLENGE_DURATIONS, CHALLENGE_ICONS, DEFAULT_CHALLENGE_DAYS,
    DEFAULT_CHALLENGE_ICON, MAX_CHALLENGE_DAYS, MAX_TITLE_GRAPHEMES,
};
pub use messages::{
    milestone_index, CelebrationMessage, DEFAULT_MESSAGES, FINAL_MESSAGES, MILESTONES,
    MILESTONE_MESSAGES,
};
pub use palettes::{Palette, DEFAULT_PALETTE};
