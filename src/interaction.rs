use crate::{
    body::{BodyId, Rgba},
    universe::Universe,
};
use cgmath::Vector2;
use rand::{SeedableRng, rngs::StdRng};
use std::fmt::Debug;

/// Turns pointer input into spawn, aim and release actions on a [`Universe`].
///
/// Button ids are only logged: any button spawns on press and releases on
/// release, like a single pointer.
pub struct Controller {
    rng: StdRng,
}

impl Controller {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Spawns a body under the pointer and starts aiming it.
    pub fn pointer_down(
        &mut self,
        universe: &mut Universe,
        pos: Vector2<f64>,
        button: impl Debug,
    ) -> BodyId {
        let color = Rgba::random(&mut self.rng);
        let id = universe.spawn(pos, color);
        universe.begin_aim(id, pos);
        log::debug!(
            "pointer down {button:?} at ({:.0}, {:.0}): spawned {id}",
            pos.x,
            pos.y
        );
        id
    }

    pub fn pointer_move(&mut self, universe: &mut Universe, pos: Vector2<f64>) {
        universe.move_pointer(pos);
    }

    pub fn pointer_up(&mut self, universe: &mut Universe, button: impl Debug) -> Option<BodyId> {
        let released = universe.release();
        match released.and_then(|id| universe.bodies.get(id)) {
            Some(body) => log::debug!(
                "pointer up {button:?}: released {} with velocity ({:.3}, {:.3})",
                body.id,
                body.vel.x,
                body.vel.y
            ),
            None => log::debug!("pointer up {button:?}"),
        }
        released
    }
}
