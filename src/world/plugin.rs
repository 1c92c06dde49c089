//! World plugin - site loading, setup and gathering.

use bevy::prelude::*;

use crate::core::{GameConfig, GameState};
use crate::inventory::DropAssets;
use crate::items::ItemCatalog;
use crate::player::{spawn_player, Player};

use super::builder::build_site;
use super::data::{load_site_definition, SiteDefinition};
use super::gathering;

/// World plugin - handles site loading, world setup and gathering.
pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, load_site_definition)
            .add_systems(OnEnter(GameState::InGame), setup_site);

        gathering::setup_gathering_systems(app);
    }
}

/// Build the site and spawn the player. Returning from pause re-enters
/// `InGame`, so this only runs while no player exists.
#[allow(clippy::too_many_arguments)]
pub fn setup_site(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    site: Res<SiteDefinition>,
    catalog: Res<ItemCatalog>,
    drop_assets: Res<DropAssets>,
    asset_server: Res<AssetServer>,
    config: Res<GameConfig>,
    players: Query<(), With<Player>>,
) {
    if !players.is_empty() {
        return;
    }

    info!("Building site");
    let inventory = build_site(
        &mut commands,
        &mut meshes,
        &mut materials,
        &site,
        &catalog,
        &drop_assets,
        &asset_server,
        &config,
    );

    spawn_player(&mut commands, site.player_start(), inventory, &config);
}
