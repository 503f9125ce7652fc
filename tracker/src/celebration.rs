use catalog::{CelebrationMessage, DEFAULT_MESSAGES, FINAL_MESSAGES, MILESTONE_MESSAGES};
use rand::Rng;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "index", rename_all = "snake_case")]
pub enum CelebrationTier {
    /// The placement that filled the last slot.
    Final,
    /// Index into the milestone table.
    Milestone(usize),
    Encouragement,
}

/// Which kind of message a placement earns. The goal outranks milestones,
/// so a 10-day challenge finishing on its 10th sticker is `Final`.
pub fn tier_for(count: u32, total: u32) -> CelebrationTier {
    if count == total {
        return CelebrationTier::Final;
    }
    match catalog::milestone_index(count) {
        Some(index) => CelebrationTier::Milestone(index),
        None => CelebrationTier::Encouragement,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Celebration {
    pub tier: CelebrationTier,
    pub count: u32,
    pub total: u32,
    pub message: CelebrationMessage,
    pub reward: Option<String>,
}

pub fn select_celebration<R: Rng>(
    count: u32,
    total: u32,
    reward: Option<&str>,
    rng: &mut R,
) -> Celebration {
    let tier = tier_for(count, total);
    let message = match tier {
        CelebrationTier::Final => FINAL_MESSAGES[rng.random_range(0..FINAL_MESSAGES.len())],
        CelebrationTier::Milestone(index) => MILESTONE_MESSAGES[index],
        CelebrationTier::Encouragement => {
            DEFAULT_MESSAGES[rng.random_range(0..DEFAULT_MESSAGES.len())]
        }
    };

    Celebration {
        tier,
        count,
        total,
        message,
        reward: reward.filter(|r| !r.is_empty()).map(str::to_string),
    }
}

/// What the celebration overlay is showing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CelebrationState {
    #[default]
    Hidden,
    Visible(Celebration),
    /// Second page shown after the message when the challenge has a reward.
    RewardVisible { reward: String },
}

impl CelebrationState {
    pub fn show(&mut self, celebration: Celebration) {
        *self = CelebrationState::Visible(celebration);
    }

    /// Advances one page: message, then reward if any, then closed.
    pub fn dismiss(&mut self) {
        *self = match std::mem::take(self) {
            CelebrationState::Visible(Celebration {
                reward: Some(reward),
                ..
            }) => CelebrationState::RewardVisible { reward },
            _ => CelebrationState::Hidden,
        };
    }

    pub fn hide(&mut self) {
        *self = CelebrationState::Hidden;
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self, CelebrationState::Hidden)
    }
}
