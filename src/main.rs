//! Headless lane battle runner.
//!
//! Loads the save, enters the furthest open stage, deploys the starter unit
//! whenever mana allows and exits once the match is decided.

use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use lane_battle::gameplay::economy::Mana;
use lane_battle::gameplay::units::SpawnRequest;
use lane_battle::menus::Menu;
use lane_battle::progress::PlayerProgress;
use lane_battle::progress::characters::{STARTING_CHARACTER, character};
use lane_battle::progress::energy::{EnergyAccount, EnergySettings};
use lane_battle::progress::stages::{EnterStageRequest, MAPS, STAGES_PER_MAP};
use lane_battle::screens::GameState;
use lane_battle::{GameSet, gameplay_running};

const FRAME_TIME: Duration = Duration::from_millis(16);

fn main() -> AppExit {
    App::new()
        .add_plugins((
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(FRAME_TIME)),
            LogPlugin::default(),
            StatesPlugin,
            lane_battle::plugin,
        ))
        .add_systems(OnEnter(GameState::StageSelect), pick_stage)
        .add_systems(
            Update,
            deploy_starter
                .before(GameSet::Input)
                .run_if(gameplay_running),
        )
        .add_systems(OnEnter(Menu::Victory), quit)
        .add_systems(OnEnter(Menu::Defeat), quit)
        .run()
}

fn pick_stage(
    progress: Res<PlayerProgress>,
    energy: Res<EnergyAccount>,
    settings: Res<EnergySettings>,
    mut requests: MessageWriter<EnterStageRequest>,
    mut exit: MessageWriter<AppExit>,
) {
    if energy.current() < settings.stage_cost {
        warn!(
            "Only {} energy; next point in {}s",
            energy.current(),
            energy.time_until_next(chrono::Utc::now()).num_seconds()
        );
        exit.write(AppExit::error());
        return;
    }

    let furthest = MAPS
        .iter()
        .flat_map(|map| (0..STAGES_PER_MAP).map(move |stage| (*map, stage)))
        .filter(|(map, stage)| progress.is_stage_unlocked(map, *stage))
        .last();
    match furthest {
        Some((map, stage)) => {
            requests.write(EnterStageRequest::new(map, stage));
        }
        None => {
            error!("No stage is open");
            exit.write(AppExit::error());
        }
    }
}

fn deploy_starter(mana: Res<Mana>, mut requests: MessageWriter<SpawnRequest>) {
    let Some(data) = character(STARTING_CHARACTER) else {
        return;
    };
    if mana.current >= data.mana_cost {
        requests.write(SpawnRequest::new(data.id));
    }
}

fn quit(mut exit: MessageWriter<AppExit>) {
    exit.write(AppExit::Success);
}
