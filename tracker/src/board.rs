//! The sticker board of one challenge: a row of `days` slots that fill in
//! order, one per day, by dragging today's sticker onto the next empty slot.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::celebration::{select_celebration, Celebration, CelebrationState};
use crate::challenges;
use crate::error::{Error, Result};
use crate::gesture::{DragSource, Gesture, GestureEvent, GestureOutcome};
use crate::models::{Challenge, ChallengeProgress, DailyStickerLog, Sticker};
use crate::placement::{next_empty_slot, Point, Rect, SlotLayout};
use crate::sticker_logs;
use crate::stickers;
use crate::App;

/// Scale pulse played on a slot after placement, or on the today pick after
/// removal.
pub const PULSE_DURATION: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacedSticker {
    pub sticker: Sticker,
    pub log: DailyStickerLog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PulseTarget {
    Slot(usize),
    TodayPick,
}

#[derive(Debug, Clone, Copy)]
struct Pulse {
    target: PulseTarget,
    until: Instant,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoardEvent {
    Placed {
        slot: usize,
        celebration: Celebration,
    },
    Removed {
        slot: usize,
    },
    /// A drag ended somewhere that accepts nothing. The board is unchanged.
    DropRejected,
    Nothing,
}

pub struct StickerBoard {
    challenge: Challenge,
    grid: Vec<Option<PlacedSticker>>,
    today: NaiveDate,
    selected: Option<Sticker>,
    layout: SlotLayout,
    gesture: Gesture,
    hover_target: Option<usize>,
    pulse: Option<Pulse>,
    celebration: CelebrationState,
    rng: StdRng,
}

impl StickerBoard {
    pub async fn load(app: &App, challenge_id: &str) -> Result<Self> {
        let mut board = Self {
            challenge: challenges::require_challenge(&app.pool, challenge_id).await?,
            grid: Vec::new(),
            today: app.today(),
            selected: None,
            layout: SlotLayout::new(),
            gesture: Gesture::new(),
            hover_target: None,
            pulse: None,
            celebration: CelebrationState::Hidden,
            rng: StdRng::from_os_rng(),
        };
        board.reload(app).await?;
        Ok(board)
    }

    /// Re-reads the challenge and its logs, keeping the registered layout.
    /// Also picks up a day change.
    pub async fn reload(&mut self, app: &App) -> Result<()> {
        self.challenge = challenges::require_challenge(&app.pool, &self.challenge.id).await?;
        self.today = app.today();

        let logs = sticker_logs::get_logs_by_challenge(&app.pool, &self.challenge.id).await?;
        let packs = stickers::get_packs_with_stickers(&app.pool).await?;
        let mut known: HashMap<String, Sticker> = packs
            .iter()
            .flat_map(|pack| pack.stickers.iter())
            .map(|sticker| (sticker.id.clone(), sticker.clone()))
            .collect();

        let mut grid: Vec<Option<PlacedSticker>> = vec![None; self.challenge.days as usize];
        for (slot, log) in grid.iter_mut().zip(logs) {
            let sticker = match known.get(&log.sticker_id) {
                Some(sticker) => sticker.clone(),
                // stickers from inactive packs still show on old logs
                None => {
                    let sticker = stickers::get_sticker(&app.pool, &log.sticker_id)
                        .await?
                        .ok_or_else(|| Error::StickerNotFound(log.sticker_id.clone()))?;
                    known.insert(sticker.id.clone(), sticker.clone());
                    sticker
                }
            };
            *slot = Some(PlacedSticker { sticker, log });
        }
        self.grid = grid;

        self.gesture.reset();
        self.hover_target = None;
        self.selected = if self.can_add_sticker() {
            packs
                .first()
                .filter(|pack| !pack.stickers.is_empty())
                .map(|pack| pack.stickers[self.rng.random_range(0..pack.stickers.len())].clone())
        } else {
            None
        };

        tracing::debug!(
            "loaded board for {}: {}/{} filled, today {}",
            self.challenge.id,
            self.filled_count(),
            self.challenge.days,
            self.today
        );
        Ok(())
    }

    /// Reloads when the calendar day moved on since the last load, keeping
    /// the chosen pick if today still takes one. Returns whether it reloaded.
    pub async fn refresh_day(&mut self, app: &App) -> Result<bool> {
        let today = app.today();
        if today == self.today {
            return Ok(false);
        }

        let selected = self.selected.take();
        self.reload(app).await?;
        if selected.is_some() && self.can_add_sticker() {
            self.selected = selected;
        }
        tracing::info!(
            "board for {} rolled over to {}",
            self.challenge.id,
            self.today
        );
        Ok(true)
    }

    pub fn seed_rng(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn challenge(&self) -> &Challenge {
        &self.challenge
    }

    pub fn grid(&self) -> &[Option<PlacedSticker>] {
        &self.grid
    }

    pub fn selected_sticker(&self) -> Option<&Sticker> {
        self.selected.as_ref()
    }

    pub fn celebration(&self) -> &CelebrationState {
        &self.celebration
    }

    pub fn register_slot(&mut self, index: usize, rect: Rect) {
        self.layout.register_slot(index, rect);
    }

    pub fn register_today_area(&mut self, rect: Rect) {
        self.layout.register_today_area(rect);
    }

    pub fn filled_count(&self) -> u32 {
        self.grid.iter().filter(|slot| slot.is_some()).count() as u32
    }

    pub fn next_slot(&self) -> Option<usize> {
        next_empty_slot(&self.grid)
    }

    pub fn progress(&self) -> ChallengeProgress {
        ChallengeProgress::new(self.challenge.days, self.filled_count())
    }

    fn today_slot(&self) -> Option<usize> {
        self.grid.iter().position(|slot| {
            slot.as_ref()
                .is_some_and(|placed| placed.log.date == self.today)
        })
    }

    /// False once today has a sticker, however many slots remain.
    pub fn can_add_sticker(&self) -> bool {
        self.today_slot().is_none()
    }

    pub fn can_drag_pick(&self) -> bool {
        self.can_add_sticker() && self.selected.is_some() && self.next_slot().is_some()
    }

    pub fn select_sticker(&mut self, sticker: Sticker) {
        tracing::debug!("today's pick is now {}", sticker.name);
        self.selected = Some(sticker);
    }

    pub fn press_pick(&mut self, at: Point, time: Instant) -> GestureOutcome {
        if !self.can_drag_pick() {
            return GestureOutcome::Ignored;
        }
        self.gesture.handle(GestureEvent::Press {
            source: DragSource::TodayPick,
            at,
            time,
        })
    }

    /// Only today's slot reacts to presses.
    pub fn press_slot(&mut self, index: usize, at: Point, time: Instant) -> GestureOutcome {
        if self.today_slot() != Some(index) {
            return GestureOutcome::Ignored;
        }
        self.gesture.handle(GestureEvent::Press {
            source: DragSource::Slot(index),
            at,
            time,
        })
    }

    pub fn pointer_move(&mut self, to: Point, time: Instant) -> GestureOutcome {
        let outcome = self.gesture.handle(GestureEvent::Move { to, time });
        self.hover_target = match self.gesture.dragging_source() {
            Some(DragSource::TodayPick) => {
                self.layout
                    .drop_target(to, self.next_slot(), self.grid.len())
            }
            _ => None,
        };
        outcome
    }

    pub fn tick(&mut self, time: Instant) -> GestureOutcome {
        if self.pulse.is_some_and(|pulse| pulse.until <= time) {
            self.pulse = None;
        }
        self.gesture.handle(GestureEvent::Tick { time })
    }

    pub async fn release(&mut self, app: &App, at: Point, time: Instant) -> Result<BoardEvent> {
        let outcome = self.gesture.handle(GestureEvent::Release { at, time });
        self.hover_target = None;

        match outcome {
            GestureOutcome::Dropped {
                source: DragSource::TodayPick,
                at,
            } => match self.layout.drop_target(at, self.next_slot(), self.grid.len()) {
                Some(slot) => self.commit_placement(app, slot, time).await,
                None => {
                    tracing::warn!(
                        "drop at ({:.0}, {:.0}) is not on slot {:?}",
                        at.x,
                        at.y,
                        self.next_slot()
                    );
                    Ok(BoardEvent::DropRejected)
                }
            },
            GestureOutcome::Dropped {
                source: DragSource::Slot(index),
                at,
            } => {
                if self.layout.in_today_area(at) {
                    self.remove(app, index, time).await
                } else {
                    Ok(BoardEvent::DropRejected)
                }
            }
            GestureOutcome::Tapped(DragSource::Slot(index)) => self.remove(app, index, time).await,
            _ => Ok(BoardEvent::Nothing),
        }
    }

    /// Places today's pick into the next slot without a drag.
    pub async fn place_today(&mut self, app: &App, time: Instant) -> Result<BoardEvent> {
        self.refresh_day(app).await?;
        if !self.can_add_sticker() {
            return Err(Error::AlreadyPlaced {
                challenge_id: self.challenge.id.clone(),
                date: self.today,
            });
        }
        let slot = self
            .next_slot()
            .ok_or_else(|| Error::ChallengeFull(self.challenge.id.clone()))?;
        self.commit_placement(app, slot, time).await
    }

    async fn commit_placement(
        &mut self,
        app: &App,
        slot: usize,
        time: Instant,
    ) -> Result<BoardEvent> {
        self.refresh_day(app).await?;
        if !self.can_add_sticker() {
            return Err(Error::AlreadyPlaced {
                challenge_id: self.challenge.id.clone(),
                date: self.today,
            });
        }
        if self.next_slot() != Some(slot) {
            return Ok(BoardEvent::DropRejected);
        }

        let sticker = self.selected.clone().ok_or(Error::NoStickerSelected)?;
        let log = sticker_logs::add_sticker_log(
            &app.pool,
            app.clock.as_ref(),
            &self.challenge.id,
            &sticker.id,
            self.today,
        )
        .await?;

        self.grid[slot] = Some(PlacedSticker { sticker, log });
        self.selected = None;
        self.pulse = Some(Pulse {
            target: PulseTarget::Slot(slot),
            until: time + PULSE_DURATION,
        });

        let celebration = select_celebration(
            self.filled_count(),
            self.challenge.days,
            self.challenge.reward.as_deref(),
            &mut self.rng,
        );
        self.celebration.show(celebration.clone());

        tracing::debug!(
            "slot {} filled, celebrating {:?}",
            slot,
            celebration.tier
        );
        Ok(BoardEvent::Placed { slot, celebration })
    }

    /// Takes today's sticker back off the board. Earlier days are fixed.
    pub async fn remove(&mut self, app: &App, index: usize, time: Instant) -> Result<BoardEvent> {
        self.refresh_day(app).await?;
        let is_today = self
            .grid
            .get(index)
            .and_then(Option::as_ref)
            .is_some_and(|placed| placed.log.date == self.today);
        if !is_today {
            return Err(Error::NotRemovable);
        }

        sticker_logs::remove_sticker_log(&app.pool, &self.challenge.id, self.today).await?;

        if let Some(placed) = self.grid[index].take() {
            self.selected = Some(placed.sticker);
        }
        self.pulse = Some(Pulse {
            target: PulseTarget::TodayPick,
            until: time + PULSE_DURATION,
        });
        self.celebration.hide();
        self.gesture.reset();

        Ok(BoardEvent::Removed { slot: index })
    }

    pub async fn remove_today(&mut self, app: &App, time: Instant) -> Result<BoardEvent> {
        self.refresh_day(app).await?;
        let index = self.today_slot().ok_or_else(|| Error::LogNotFound {
            challenge_id: self.challenge.id.clone(),
            date: self.today,
        })?;
        self.remove(app, index, time).await
    }

    pub fn dismiss_celebration(&mut self) {
        self.celebration.dismiss();
    }

    fn pulsing(&self, target: PulseTarget, at: Instant) -> bool {
        self.pulse
            .is_some_and(|pulse| pulse.target == target && pulse.until > at)
    }

    pub fn view(&self, at: Instant) -> BoardView {
        let today_slot = self.today_slot();
        let slots = self
            .grid
            .iter()
            .enumerate()
            .map(|(index, slot)| SlotView {
                index,
                sticker: slot.as_ref().map(|placed| placed.sticker.clone()),
                date: slot.as_ref().map(|placed| placed.log.date),
                removable: today_slot == Some(index),
                hovered: self.hover_target == Some(index),
                pulsing: self.pulsing(PulseTarget::Slot(index), at),
            })
            .collect();

        let ghost = self.gesture.dragging_source().and_then(|source| {
            let sticker = match source {
                DragSource::TodayPick => self.selected.clone(),
                DragSource::Slot(index) => self
                    .grid
                    .get(index)
                    .and_then(|slot| slot.as_ref().map(|placed| placed.sticker.clone())),
            }?;
            Some(GhostView {
                sticker,
                origin: self.gesture.ghost_origin()?,
                source,
            })
        });

        BoardView {
            challenge_id: self.challenge.id.clone(),
            title: self.challenge.title.clone(),
            icon: self.challenge.icon.clone(),
            reward: self.challenge.reward.clone(),
            today: self.today,
            slots,
            progress: self.progress(),
            next_slot: self.next_slot(),
            can_add_sticker: self.can_add_sticker(),
            can_drag: self.can_drag_pick(),
            today_pick: self.selected.clone(),
            today_pick_pulsing: self.pulsing(PulseTarget::TodayPick, at),
            ghost,
            celebration: self.celebration.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotView {
    pub index: usize,
    pub sticker: Option<Sticker>,
    pub date: Option<NaiveDate>,
    pub removable: bool,
    pub hovered: bool,
    pub pulsing: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GhostView {
    pub sticker: Sticker,
    pub origin: Point,
    pub source: DragSource,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardView {
    pub challenge_id: String,
    pub title: String,
    pub icon: String,
    pub reward: Option<String>,
    pub today: NaiveDate,
    pub slots: Vec<SlotView>,
    pub progress: ChallengeProgress,
    pub next_slot: Option<usize>,
    pub can_add_sticker: bool,
    pub can_drag: bool,
    pub today_pick: Option<Sticker>,
    pub today_pick_pulsing: bool,
    pub ghost: Option<GhostView>,
    pub celebration: CelebrationState,
}
