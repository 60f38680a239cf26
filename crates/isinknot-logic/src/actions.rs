//! Starting and resolving the player's timed actions.
//!
//! Every action goes through [`GameState::begin_action`], so a second action
//! is refused while one is cooling down. Side effects that happen up front
//! (placing the construction placeholder, starting the rowing boost) run only
//! after the action has been accepted.

use crate::audio::Sound;
use crate::context::GameContext;
use crate::modules::ModuleKind;
use crate::state::{ActionError, PendingAction};

pub fn begin_build(ctx: &mut GameContext, x: usize, y: usize, kind: ModuleKind) -> Result<(), ActionError> {
    if !ctx.state.ship.can_build_module(x, y, kind) {
        return Err(ActionError::NotBuildable { x, y, kind });
    }
    let build_time = kind.descriptor().build_time_ms;
    ctx.state
        .begin_action(PendingAction::Build { x, y, kind }, build_time)?;
    ctx.state.ship.add_module(x, y, ModuleKind::Construction);
    ctx.play(Sound::Confirm);
    Ok(())
}

pub fn begin_repair(ctx: &mut GameContext, x: usize, y: usize) -> Result<(), ActionError> {
    let draught = ctx.state.draught;
    let repairable = ctx
        .state
        .ship
        .get_module(x, y, None)
        .map(|m| m.can_start_repair() && m.percent_submerged(draught) < 1.0)
        .unwrap_or(false);
    if !repairable {
        return Err(ActionError::NotRepairable { x, y });
    }
    let repair_time = ctx.tuning.repair_time_ms;
    ctx.state
        .begin_action(PendingAction::Repair { x, y }, repair_time)?;
    ctx.state.ship.start_repair(x, y);
    ctx.play(Sound::Repairing);
    Ok(())
}

pub fn begin_bail(ctx: &mut GameContext) -> Result<(), ActionError> {
    let bail_time = ctx.tuning.bail_time_ms;
    ctx.state.begin_action(PendingAction::Bail, bail_time)
}

pub fn begin_row(ctx: &mut GameContext) -> Result<(), ActionError> {
    let row_time = ctx.tuning.row_time_ms;
    ctx.state.begin_action(PendingAction::Row, row_time)?;
    ctx.state.speed_boost = ctx.tuning.row_boost;
    ctx.play(Sound::Row);
    Ok(())
}

/// Apply a finished action's effect.
pub fn resolve(ctx: &mut GameContext, action: PendingAction) {
    log::debug!("Resolve {:?}", action);
    match action {
        PendingAction::Build { x, y, kind } => ctx.state.ship.add_module(x, y, kind),
        PendingAction::Repair { x, y } => ctx.state.ship.finish_repair(x, y),
        PendingAction::Bail => ctx.state.ship.bail(ctx.tuning.bail_amount),
        PendingAction::Row => ctx.state.speed_boost = 0.0,
    }
}
