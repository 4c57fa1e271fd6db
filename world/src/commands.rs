//! Player intents other than ticks and run resets.
//!
//! Every handler validates before it mutates, so a rejected command leaves the
//! world exactly as it found it.

use glam::Vec2;
use tower_siege_core::{
    definitions::rank_tier, CellCoord, Event, GameMode, Phase, Rejection, TowerId, TowerKind,
};
use tracing::debug;

use crate::{effects::GOLD_TINT, towers::MapScaling, World};

type Outcome = Result<(), Rejection>;

impl World {
    /// Refuses commands that only make sense while a run is in progress.
    fn ensure_running(&self) -> Outcome {
        match self.phase {
            Phase::GameOver | Phase::Scoreboard => Err(Rejection::WrongPhase),
            Phase::Prep | Phase::Busy | Phase::Wave => Ok(()),
        }
    }

    fn selected(&self) -> Result<TowerId, Rejection> {
        self.selected_tower
            .filter(|id| self.towers.contains(*id))
            .ok_or(Rejection::NoSelection)
    }

    pub(crate) fn select_tower_type(
        &mut self,
        kind: Option<TowerKind>,
        out: &mut Vec<Event>,
    ) -> Outcome {
        self.ensure_running()?;
        if let Some(kind) = kind {
            if kind.is_building() && !self.unlocked.contains(&kind) {
                return Err(Rejection::Locked);
            }
        }
        self.selected_kind = kind;
        if self.selected_tower.take().is_some() {
            out.push(Event::TowerSelected { tower: None });
        }
        out.push(Event::TowerTypeSelected { kind });
        Ok(())
    }

    /// Selects the tower on `cell`, or builds the selected kind there.
    ///
    /// On the game-over screen any click moves on to the scoreboard.
    pub(crate) fn place_or_select(&mut self, cell: CellCoord, out: &mut Vec<Event>) -> Outcome {
        if self.paused {
            return Err(Rejection::Paused);
        }
        match self.phase {
            Phase::GameOver => return self.acknowledge_game_over(out),
            Phase::Scoreboard => return Err(Rejection::WrongPhase),
            Phase::Prep | Phase::Busy | Phase::Wave => {}
        }
        if !self.layout.contains(cell) {
            return Err(Rejection::InvalidCell);
        }

        if let Some(id) = self.towers.at_cell(cell) {
            self.selected_tower = Some(id);
            self.selected_kind = None;
            out.push(Event::TowerSelected { tower: Some(id) });
            return Ok(());
        }
        let Some(kind) = self.selected_kind else {
            self.selected_tower = None;
            out.push(Event::TowerSelected { tower: None });
            return Ok(());
        };

        if !self.is_buildable(cell) {
            return Err(Rejection::InvalidCell);
        }
        let definition = kind.definition();
        if self.gold < definition.cost {
            return Err(Rejection::InsufficientFunds);
        }
        let (built, cap) = if kind.is_building() {
            (self.towers.count_matching(true), self.config.max_buildings)
        } else {
            (self.towers.count_matching(false), self.config.max_towers)
        };
        if built >= cap {
            return Err(Rejection::CapReached);
        }

        self.gold -= definition.cost;
        let scaling = MapScaling::for_map(self.mode, self.map_number);
        let id = self.towers.insert(kind, cell, scaling, self.veteran_xp);
        self.effects.burst(cell.center(), definition.tint, 8);
        if let Some(tower) = self.towers.get(id).filter(|tower| tower.rank > 0) {
            self.effects
                .text(tower.position, rank_tier(tower.rank).name.to_owned());
        }
        debug!(?id, ?kind, ?cell, gold = self.gold, "tower placed");
        out.push(Event::TowerPlaced {
            tower: id,
            kind,
            cell,
            cost: definition.cost,
        });
        Ok(())
    }

    /// Handles a wave request from the player.
    pub(crate) fn request_wave(&mut self, out: &mut Vec<Event>) -> Outcome {
        if self.paused {
            return Err(Rejection::Paused);
        }
        if self.mode == GameMode::CampaignPreview || self.phase != Phase::Prep {
            return Err(Rejection::WrongPhase);
        }
        self.start_wave(out);
        Ok(())
    }

    pub(crate) fn upgrade_selected(&mut self, out: &mut Vec<Event>) -> Outcome {
        self.ensure_running()?;
        let id = self.selected()?;
        let cost = self
            .towers
            .get(id)
            .and_then(|tower| tower.upgrade_cost())
            .ok_or(Rejection::CapReached)?;
        if self.gold < cost {
            return Err(Rejection::InsufficientFunds);
        }

        let Some(tower) = self.towers.get_mut(id) else {
            return Err(Rejection::NoSelection);
        };
        self.gold -= cost;
        tower.upgrade();
        let (level, position) = (tower.level, tower.position);
        self.effects.burst(position, GOLD_TINT, 10);
        debug!(?id, level, cost, "tower upgraded");
        out.push(Event::TowerUpgraded {
            tower: id,
            level,
            cost,
        });
        Ok(())
    }

    pub(crate) fn repair_selected(&mut self, out: &mut Vec<Event>) -> Outcome {
        self.ensure_running()?;
        let id = self.selected()?;
        let cost = self.towers.get(id).map_or(0, |tower| tower.repair_cost());
        if cost == 0 {
            return Err(Rejection::NothingToRepair);
        }
        if self.gold < cost {
            return Err(Rejection::InsufficientFunds);
        }

        self.gold -= cost;
        if let Some(tower) = self.towers.get_mut(id) {
            tower.hp = tower.max_hp as f32;
        }
        out.push(Event::TowerRepaired { tower: id, cost });
        Ok(())
    }

    pub(crate) fn sell_selected(&mut self, out: &mut Vec<Event>) -> Outcome {
        self.ensure_running()?;
        let id = self.selected()?;
        let Some(tower) = self.towers.remove(id) else {
            return Err(Rejection::NoSelection);
        };
        let refund = tower.sell_value();
        self.earn(refund);
        self.selected_tower = None;
        self.effects.text(tower.position, format!("+{refund}"));
        debug!(?id, refund, "tower sold");
        out.push(Event::TowerSold { tower: id, refund });
        Ok(())
    }

    pub(crate) fn toggle_pause(&mut self, out: &mut Vec<Event>) -> Outcome {
        self.ensure_running()?;
        self.paused = !self.paused;
        out.push(Event::PauseToggled {
            paused: self.paused,
        });
        Ok(())
    }

    pub(crate) fn pan_camera(&mut self, delta: Vec2) -> Outcome {
        if !self.mode.is_campaign() {
            return Err(Rejection::WrongPhase);
        }
        self.camera.pan(delta, self.layout.bounds());
        Ok(())
    }

    pub(crate) fn zoom_camera(&mut self, delta: f32) -> Outcome {
        if !self.mode.is_campaign() {
            return Err(Rejection::WrongPhase);
        }
        self.camera.zoom_by(delta, self.layout.bounds());
        Ok(())
    }

    pub(crate) fn acknowledge_game_over(&mut self, out: &mut Vec<Event>) -> Outcome {
        if self.phase != Phase::GameOver {
            return Err(Rejection::WrongPhase);
        }
        self.phase = Phase::Scoreboard;
        out.push(Event::PhaseChanged {
            phase: Phase::Scoreboard,
        });
        Ok(())
    }
}
