use serde::{Deserialize, Serialize};

use crate::stage::StageId;
use crate::state::{EnemyClass, EntityId};

/// What hurt the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitSource {
    Projectile(EntityId),
    Contact(EntityId),
}

/// Notable outcomes of one frame, in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameEvent {
    ProjectileFired {
        enemy_id: EntityId,
        projectile_id: EntityId,
    },
    PlayerHit {
        source: HitSource,
        hp: u32,
    },
    /// A ducking player let a projectile pass. Reported once per projectile.
    ShotDodged {
        projectile_id: EntityId,
    },
    EnemyKilled {
        enemy_id: EntityId,
        class: EnemyClass,
        kill_count: u32,
    },
    Healed {
        hp: u32,
    },
    KnockedDown {
        score: u32,
    },
    EnemySpawned {
        enemy_id: EntityId,
        class: EnemyClass,
    },
    StageCleared {
        from: StageId,
        to: StageId,
    },
    GameWon {
        score: u32,
    },
}
