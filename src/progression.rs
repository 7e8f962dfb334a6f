//! Level progression and enemy spawn planning
//!
//! Each cleared level advances the counter and raises the enemy budget.
//! Even levels are boss levels.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Enemies added to the budget on every new level.
pub const ENEMY_STEP: u32 = 5;

/// What to spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnKind {
    /// Regular enemy; `variant` picks one of the available enemy kinds
    Enemy { variant: usize },
    Boss,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Spawn {
    pub kind: SpawnKind,
    /// Horizontal world position; spawns start on the floor line
    pub x: f32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnPlan {
    pub level: u32,
    pub spawns: Vec<Spawn>,
}

impl SpawnPlan {
    pub fn is_boss_level(&self) -> bool {
        self.spawns.iter().any(|s| s.kind == SpawnKind::Boss)
    }

    pub fn len(&self) -> usize {
        self.spawns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spawns.is_empty()
    }
}

/// Current level and enemy budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgression {
    pub current_level: u32,
    pub enemies_to_spawn: u32,
}

impl Default for LevelProgression {
    fn default() -> Self {
        Self {
            current_level: 1,
            enemies_to_spawn: ENEMY_STEP,
        }
    }
}

impl LevelProgression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_boss_level(&self) -> bool {
        self.current_level % 2 == 0
    }

    /// Move on to the next level.
    pub fn advance(&mut self) {
        self.current_level += 1;
        self.enemies_to_spawn += ENEMY_STEP;
    }

    /// Plan the spawns for the current level.
    ///
    /// Boss levels get `current_level / 2` bosses; other levels get
    /// `enemies_to_spawn` enemies with a variant in `0..enemy_kinds`.
    /// Positions are uniform in `[-map_size / 2, map_size / 2)`.
    pub fn spawn_plan<R: Rng>(&self, map_size: f32, enemy_kinds: usize, rng: &mut R) -> SpawnPlan {
        let half = map_size.abs() / 2.0;
        let position = |rng: &mut R| if half > 0.0 { rng.gen_range(-half..half) } else { 0.0 };

        let spawns = if self.is_boss_level() {
            (0..self.current_level / 2)
                .map(|_| Spawn { kind: SpawnKind::Boss, x: position(rng) })
                .collect()
        } else {
            (0..self.enemies_to_spawn)
                .map(|_| {
                    let variant = if enemy_kinds > 1 { rng.gen_range(0..enemy_kinds) } else { 0 };
                    Spawn { kind: SpawnKind::Enemy { variant }, x: position(rng) }
                })
                .collect()
        };

        SpawnPlan {
            level: self.current_level,
            spawns,
        }
    }
}
