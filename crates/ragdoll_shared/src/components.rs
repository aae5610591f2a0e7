// crates/ragdoll_shared/src/components.rs
use std::collections::HashMap;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: 1.0,
        }
    }
}

impl Transform {
    /// Unit vector the actor walks along (+Z in model space).
    pub fn forward(&self) -> Vec3 {
        (self.rotation * Vec3::Z).normalize()
    }

    pub fn sideways(&self) -> Vec3 {
        (self.rotation * Vec3::X).normalize()
    }
}

/// Velocity integration parameters. `deceleration` is applied per axis as a
/// fraction of the current velocity each second.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Kinematics {
    pub velocity: Vec3,
    pub acceleration: Vec3,
    pub deceleration: Vec3,
}

impl Default for Kinematics {
    fn default() -> Self {
        Self {
            velocity: Vec3::ZERO,
            acceleration: Vec3::new(1.0, 0.25, 50.0),
            deceleration: Vec3::new(-0.0005, -0.0001, -5.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityOptions {
    pub scale: f32,
    pub shadow: bool,
    pub kinematics: Kinematics,
}

impl Default for EntityOptions {
    fn default() -> Self {
        Self {
            scale: 0.1,
            shadow: true,
            kinematics: Kinematics::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum StateValue {
    Bool(bool),
    Number(f32),
    Text(String),
}

/// Free-form per-entity variables (movement flags, timers, toggles).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateBag {
    values: HashMap<String, StateValue>,
}

impl StateBag {
    pub fn set(&mut self, name: &str, value: StateValue) -> Option<StateValue> {
        self.values.insert(name.to_string(), value)
    }

    pub fn get(&self, name: &str) -> Option<&StateValue> {
        self.values.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<StateValue> {
        self.values.remove(name)
    }

    pub fn flag(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(StateValue::Bool(true)))
    }

    pub fn set_flag(&mut self, name: &str, on: bool) {
        self.set(name, StateValue::Bool(on));
    }

    /// Flips a flag and returns its new value.
    pub fn toggle(&mut self, name: &str) -> bool {
        let on = !self.flag(name);
        self.set_flag(name, on);
        on
    }

    pub fn number(&self, name: &str) -> Option<f32> {
        match self.values.get(name) {
            Some(StateValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(StateValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_follows_rotation() {
        let mut transform = Transform::default();
        assert!((transform.forward() - Vec3::Z).length() < 1e-6);

        transform.rotation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        assert!((transform.forward() - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn state_bag_typed_access() {
        let mut bag = StateBag::default();
        assert!(!bag.flag("ragdoll"));
        assert!(bag.toggle("ragdoll"));
        assert!(bag.flag("ragdoll"));

        bag.set("timer", StateValue::Number(1.5));
        bag.set("direction", StateValue::Text("forward".into()));
        assert_eq!(bag.number("timer"), Some(1.5));
        assert_eq!(bag.text("direction"), Some("forward"));
        assert_eq!(bag.number("direction"), None);
        assert_eq!(bag.len(), 3);
    }
}
