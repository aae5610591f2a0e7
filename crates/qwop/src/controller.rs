// crates/qwop/src/controller.rs
use std::f32::consts::PI;

use glam::{Quat, Vec3};
use ragdoll_core::input::OutputState;
use ragdoll_core::Entity;

use crate::keybinds::{BACKWARD, FORWARD, LEFT, MODS, MOVE, RIGHT, TURN};
use crate::states::DANCE;

/// Turns held inputs into velocity and heading. Runs before the entity's own
/// update, which decelerates and moves it.
pub fn steer(player: &mut Entity, input: &OutputState, dt: f32) {
    let base = player.kinematics().acceleration;
    let mut acc = base;
    if input.is_active(MODS) {
        acc *= 2.0;
    }
    if player.current_state() == Some(DANCE) {
        acc = Vec3::ZERO;
    }

    let velocity = &mut player.kinematics_mut().velocity;
    match input.head(MOVE) {
        Some(FORWARD) => velocity.z += acc.z * dt,
        Some(BACKWARD) => velocity.z -= acc.z * dt,
        _ => {}
    }

    let angle = 4.0 * PI * dt * base.y;
    let turn = match input.head(TURN) {
        Some(LEFT) => Quat::from_axis_angle(Vec3::Y, angle),
        Some(RIGHT) => Quat::from_axis_angle(Vec3::Y, -angle),
        _ => return,
    };
    let transform = player.transform_mut();
    transform.rotation = (transform.rotation * turn).normalize();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keybinds::{input_config, keybinds};
    use crate::states::character_states;
    use ragdoll_core::animation::AnimationClip;
    use ragdoll_core::input::Controls;
    use ragdoll_shared::{EntityOptions, KeyMode, RawKeyEvent};

    struct Rig {
        player: Entity,
        controls: Controls<Entity>,
    }

    impl Rig {
        fn new() -> Self {
            let mut player = Entity::new("player", EntityOptions::default());
            player.add_states(character_states());
            player.insert_clip(AnimationClip::new(DANCE, 3.0));
            let mut controls = Controls::new(keybinds(KeyMode::Code));
            controls.configure(&input_config(KeyMode::Code));
            Self { player, controls }
        }

        fn press(&mut self, code: &str) {
            self.controls.handle(&RawKeyEvent::down("", code), &mut self.player);
        }

        fn steer(&mut self, dt: f32) {
            steer(&mut self.player, self.controls.input(), dt);
        }
    }

    #[test]
    fn forward_accelerates_and_shift_doubles() {
        let mut rig = Rig::new();
        rig.press("KeyW");
        rig.steer(0.1);
        // acc.z = 50
        assert!((rig.player.kinematics().velocity.z - 5.0).abs() < 1e-4);

        rig.press("ShiftLeft");
        rig.steer(0.1);
        assert!((rig.player.kinematics().velocity.z - 15.0).abs() < 1e-4);
    }

    #[test]
    fn newest_direction_wins() {
        let mut rig = Rig::new();
        rig.press("KeyW");
        rig.press("KeyS");
        rig.steer(0.1);
        assert!((rig.player.kinematics().velocity.z + 5.0).abs() < 1e-4);
    }

    #[test]
    fn turning_rotates_about_y() {
        let mut rig = Rig::new();
        rig.press("KeyA");
        rig.steer(0.5);
        // 4 * pi * 0.5 * 0.25 = pi / 2
        let forward = rig.player.transform().forward();
        assert!((forward - Vec3::X).length() < 1e-4);
        assert_eq!(rig.player.kinematics().velocity, Vec3::ZERO);
    }

    #[test]
    fn dancing_holds_still() {
        let mut rig = Rig::new();
        rig.press("KeyE");
        assert_eq!(rig.player.current_state(), Some(DANCE));
        rig.press("KeyW");
        rig.steer(0.1);
        assert_eq!(rig.player.kinematics().velocity.z, 0.0);
    }
}
