use crate::state::Projectile;

/// Move every projectile in a straight line and drop those that left the stage.
///
/// A projectile is pruned once its position is more than `margin` outside
/// `[0, stage_width] x [0, stage_height]` on any side.
pub fn step_projectiles(
    projectiles: Vec<Projectile>,
    stage_width: f32,
    stage_height: f32,
    margin: f32,
) -> Vec<Projectile> {
    projectiles
        .into_iter()
        .map(|mut p| {
            p.position += p.velocity;
            p
        })
        .filter(|p| in_bounds(p, stage_width, stage_height, margin))
        .collect()
}

fn in_bounds(p: &Projectile, stage_width: f32, stage_height: f32, margin: f32) -> bool {
    p.position.x >= -margin
        && p.position.x <= stage_width + margin
        && p.position.y >= -margin
        && p.position.y <= stage_height + margin
}
