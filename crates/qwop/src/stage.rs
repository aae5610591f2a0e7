// crates/qwop/src/stage.rs
use std::path::PathBuf;

use ragdoll_core::animation::{LoadModelsConfig, LoaderRegistry, ModelFormat};
use ragdoll_core::input::{Controls, KeyboardHub};
use ragdoll_core::{Entity, SandboxConfig, Stage};
use ragdoll_shared::{EntityOptions, InputConfig};

use crate::controller;
use crate::keybinds::{self, WAVE};
use crate::states::{self, ANIMATIONS};

/// The built-in character: `models/fbx/qwop/character.fbx` plus its clips.
pub fn default_model() -> LoadModelsConfig {
    let mut model = LoadModelsConfig::new("qwop", "character", ModelFormat::Fbx);
    model.anim_names = ANIMATIONS.iter().map(|name| name.to_string()).collect();
    model.addit_anim_names = vec![WAVE.to_string()];
    model
}

/// One keyboard-driven character.
pub struct QwopStage {
    player: Entity,
    controls: Controls<Entity>,
    layout: InputConfig,
    model: LoadModelsConfig,
    loaders: LoaderRegistry,
    asset_root: PathBuf,
}

impl QwopStage {
    pub fn new(config: &SandboxConfig) -> Self {
        let mut player = Entity::new("player", EntityOptions::default());
        player.add_states(states::character_states());

        let mode = config.input_mode;
        let controls = Controls::new(keybinds::keybinds(mode)).with_state_manager(keybinds::state_manager());

        Self {
            player,
            controls,
            layout: keybinds::input_config(mode),
            model: config.model.clone().unwrap_or_else(default_model),
            loaders: LoaderRegistry::with_manifests(),
            asset_root: config.asset_root.clone(),
        }
    }

    pub fn player(&self) -> &Entity {
        &self.player
    }

    pub fn controls(&self) -> &Controls<Entity> {
        &self.controls
    }
}

impl Stage for QwopStage {
    fn on_load(&mut self, hub: &KeyboardHub) {
        self.controls.listen(hub, &self.layout);
        self.player
            .load_models(&self.model, &self.loaders, self.asset_root.clone());
        tracing::info!(model = ?self.player.model_path(), root = %self.asset_root.display(), "qwop stage loaded");
    }

    fn handle_input(&mut self) {
        self.controls.pump(&mut self.player);
    }

    fn focus_lost(&mut self) {
        self.controls.release_all(&mut self.player);
    }

    fn update(&mut self, dt: f32) {
        self.player.poll_loads();
        controller::steer(&mut self.player, self.controls.input(), dt);
        self.player.update(dt, Some(self.controls.input()));
    }

    fn on_unload(&mut self) {
        self.controls.unlisten();
        tracing::info!(position = ?self.player.transform().position, "qwop stage unloaded");
    }
}
