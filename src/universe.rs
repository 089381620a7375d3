use crate::{
    body::{Body, BodyId, BodyList, Rgba},
    drawing::Canvas,
};
use cgmath::{InnerSpace, Vector2};

pub const G: f64 = 6.67e-11;
pub const FORCE_SCALE: f64 = 100.0;
pub const LAUNCH_DIVISOR: f64 = 100.0;
pub const AIM_GROWTH: f64 = 1.0;
/// Floor for the squared distance in [`gravity`], so coincident bodies give a finite pull.
pub const MIN_DISTANCE_SQUARED: f64 = f64::EPSILON;

pub const BACKGROUND: Rgba = Rgba::BLACK;
pub const AIM_LINE_COLOR: Rgba = Rgba::WHITE;

/// The body currently held under the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aim {
    pub body: BodyId,
    pub pointer: Vector2<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct Universe {
    pub bodies: BodyList,
    aim: Option<Aim>,
}

impl Universe {
    pub fn new() -> Self {
        Self {
            bodies: BodyList::new(),
            aim: None,
        }
    }

    pub fn spawn(&mut self, pos: Vector2<f64>, color: Rgba) -> BodyId {
        self.bodies.push(|id| Body::spawn(id, pos, color))
    }

    pub fn aim(&self) -> Option<Aim> {
        self.aim
    }

    pub fn is_aimed(&self, id: BodyId) -> bool {
        self.aim.is_some_and(|aim| aim.body == id)
    }

    /// Starts aiming `body`. Any previously aimed body is released as is.
    pub fn begin_aim(&mut self, body: BodyId, pointer: Vector2<f64>) {
        self.aim = Some(Aim { body, pointer });
    }

    pub fn move_pointer(&mut self, pointer: Vector2<f64>) {
        if let Some(aim) = &mut self.aim {
            aim.pointer = pointer;
        }
    }

    /// Lets go of the aimed body. Its last computed velocity is kept.
    pub fn release(&mut self) -> Option<BodyId> {
        self.aim.take().map(|aim| aim.body)
    }

    /// Advances the simulation by one tick and draws it into `canvas`.
    ///
    /// The outer loop reads the live length of the body list, so a body produced
    /// by a merge is already visited later in the same tick. The inner loop only
    /// covers bodies that existed when it started: `p` keeps going after it has
    /// merged, and must not meet the body it was just merged into. Returns the
    /// number of merges that happened.
    pub fn step(&mut self, canvas: &mut impl Canvas) -> usize {
        canvas.clear(BACKGROUND);

        if let Some(aim) = self.aim
            && let Some(body) = self.bodies.get_mut(aim.body)
        {
            body.radius += AIM_GROWTH;
        }

        let mut merges = 0;
        let mut i = 0;
        while i < self.bodies.len() {
            let id = BodyId(i);
            i += 1;
            if !self.bodies[id].alive {
                continue;
            }

            if let Some(aim) = self.aim
                && aim.body == id
            {
                let p = &mut self.bodies[id];
                canvas.line(p.pos, aim.pointer, AIM_LINE_COLOR);
                p.vel = -p.direction_to(aim.pointer) / LAUNCH_DIVISOR;
            }

            for j in 0..self.bodies.len() {
                let t = self.bodies[BodyId(j)];
                if t.id == id || !t.alive {
                    continue;
                }

                let p = self.bodies[id];
                if p.distance_to(t.pos) <= p.radius + t.radius {
                    self.merge(id, t.id);
                    merges += 1;
                    continue;
                }

                self.bodies[id].vel += gravity(&p, &t);
            }

            let aimed = self.is_aimed(id);
            let p = &mut self.bodies[id];
            if !aimed {
                p.pos += p.vel;
            }
            if p.alive {
                canvas.circle(p.pos, p.radius, p.color);
            }
        }
        merges
    }

    /// Kills `p` and `t` and appends the body they merge into. A held aim moves
    /// to the new body.
    fn merge(&mut self, p: BodyId, t: BodyId) -> BodyId {
        self.bodies[p].alive = false;
        self.bodies[t].alive = false;
        let (p_body, t_body) = (self.bodies[p], self.bodies[t]);
        let merged = self.bodies.push(|id| Body::merge(&p_body, &t_body, id));

        // only the newest body may be held
        if let Some(aim) = &mut self.aim {
            aim.body = merged;
        }

        log::debug!(
            "merged {p} and {t} into {merged} (radius {:.3})",
            self.bodies[merged].radius
        );
        merged
    }
}

/// Velocity change `t` imposes on `p` over one tick.
///
/// The displacement is not normalized, so the pull scales with distance on top
/// of the inverse square term.
pub fn gravity(p: &Body, t: &Body) -> Vector2<f64> {
    let direction = p.direction_to(t.pos);
    let distance2 = direction.magnitude2().max(MIN_DISTANCE_SQUARED);
    let force = G * (p.mass() * t.mass()) / distance2;
    direction * (force / p.mass()) * FORCE_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing::DrawHandler;
    use approx::assert_relative_eq;
    use cgmath::Zero;

    fn spawn(universe: &mut Universe, x: f64, y: f64) -> BodyId {
        universe.spawn(Vector2::new(x, y), Rgba::opaque(10, 20, 30))
    }

    #[test]
    fn lone_body_stays_put() {
        let mut universe = Universe::new();
        let id = spawn(&mut universe, 50.0, 60.0);
        universe.step(&mut DrawHandler::new());
        assert_eq!(universe.bodies[id].pos, Vector2::new(50.0, 60.0));
        assert!(universe.bodies[id].alive);
    }

    #[test]
    fn distant_bodies_attract() {
        let mut universe = Universe::new();
        let a = spawn(&mut universe, 0.0, 0.0);
        let b = spawn(&mut universe, 100.0, 0.0);
        universe.step(&mut DrawHandler::new());
        assert!(universe.bodies[a].vel.x > 0.0);
        assert!(universe.bodies[b].vel.x < 0.0);
        assert_relative_eq!(universe.bodies[a].vel.y, 0.0);
        // same radius, same mass: mirrored pull
        assert_relative_eq!(universe.bodies[a].vel.x, -universe.bodies[b].vel.x, max_relative = 1e-6);
    }

    #[test]
    fn gravity_uses_raw_displacement() {
        let p = Body::spawn(BodyId(0), Vector2::zero(), Rgba::WHITE);
        let near = Body::spawn(BodyId(1), Vector2::new(10.0, 0.0), Rgba::WHITE);
        let far = Body::spawn(BodyId(2), Vector2::new(20.0, 0.0), Rgba::WHITE);
        // 1/d^2 times d: twice the distance gives half the pull
        assert_relative_eq!(gravity(&p, &near).x, 2.0 * gravity(&p, &far).x, max_relative = 1e-12);
        let expected = G * near.mass() / 100.0 * 10.0 * FORCE_SCALE;
        assert_relative_eq!(gravity(&p, &near).x, expected, max_relative = 1e-12);
    }

    #[test]
    fn overlapping_bodies_merge_once() {
        let mut universe = Universe::new();
        let a = spawn(&mut universe, 0.0, 0.0);
        let b = spawn(&mut universe, 3.0, 0.0);
        let merges = universe.step(&mut DrawHandler::new());
        assert_eq!(merges, 1);
        assert!(!universe.bodies[a].alive);
        assert!(!universe.bodies[b].alive);
        assert_eq!(universe.bodies.len(), 3);
        let merged = universe.bodies.last().unwrap();
        assert!(merged.alive);
        assert_relative_eq!(merged.radius, 8.0_f64.sqrt());
        assert_eq!(merged.vel, Vector2::zero());
        assert_eq!(merged.color, Rgba::opaque(20, 40, 60));
    }

    #[test]
    fn merged_body_is_drawn_in_the_same_tick() {
        let mut universe = Universe::new();
        spawn(&mut universe, 0.0, 0.0);
        spawn(&mut universe, 3.0, 0.0);
        let mut d = DrawHandler::new();
        universe.step(&mut d);
        assert_eq!(d.circles.len(), 1);
        assert_relative_eq!(d.circles[0].radius, 8.0_f32.sqrt());
    }

    #[test]
    fn merged_body_keeps_sweeping_its_pass() {
        let mut universe = Universe::new();
        spawn(&mut universe, 0.0, 0.0);
        spawn(&mut universe, 1.0, 0.0);
        spawn(&mut universe, 2.0, 0.0);
        // the first body swallows both neighbours, then the two results merge
        assert_eq!(universe.step(&mut DrawHandler::new()), 3);
        assert_eq!(universe.bodies.len(), 6);
        assert_eq!(universe.bodies.alive_count(), 1);
        assert!(universe.bodies.last().unwrap().alive);
    }

    #[test]
    fn touching_counts_as_collision() {
        let mut universe = Universe::new();
        spawn(&mut universe, 0.0, 0.0);
        spawn(&mut universe, 4.0, 0.0);
        assert_eq!(universe.step(&mut DrawHandler::new()), 1);
    }

    #[test]
    fn aimed_body_grows_and_is_not_integrated() {
        let mut universe = Universe::new();
        let id = spawn(&mut universe, 100.0, 100.0);
        universe.begin_aim(id, Vector2::new(100.0, 100.0));
        universe.move_pointer(Vector2::new(150.0, 120.0));
        universe.step(&mut DrawHandler::new());
        universe.step(&mut DrawHandler::new());
        let body = universe.bodies[id];
        assert_relative_eq!(body.radius, 4.0);
        assert_eq!(body.pos, Vector2::new(100.0, 100.0));
        assert_relative_eq!(body.vel.x, -0.5);
        assert_relative_eq!(body.vel.y, -0.2);
    }

    #[test]
    fn aim_line_is_drawn_while_aiming() {
        let mut universe = Universe::new();
        let id = spawn(&mut universe, 0.0, 0.0);
        universe.begin_aim(id, Vector2::new(30.0, 40.0));
        let mut d = DrawHandler::new();
        universe.step(&mut d);
        assert_eq!(d.quads.len(), 1);
        assert_relative_eq!(d.quads[0].size.x, 50.0);

        universe.release();
        universe.step(&mut d);
        assert!(d.quads.is_empty());
    }

    #[test]
    fn aim_follows_the_aimed_body_into_a_merge() {
        let mut universe = Universe::new();
        spawn(&mut universe, 0.0, 0.0);
        let aimed = spawn(&mut universe, 3.0, 0.0);
        universe.begin_aim(aimed, Vector2::new(3.0, 0.0));
        universe.step(&mut DrawHandler::new());
        let merged = universe.bodies.last().unwrap().id;
        assert_eq!(universe.aim().map(|aim| aim.body), Some(merged));
    }

    #[test]
    fn any_merge_hands_the_aim_to_the_newest_body() {
        let mut universe = Universe::new();
        let first = spawn(&mut universe, 500.0, 500.0);
        spawn(&mut universe, 0.0, 0.0);
        spawn(&mut universe, 3.0, 0.0);
        universe.begin_aim(first, Vector2::new(500.0, 500.0));
        universe.step(&mut DrawHandler::new());

        let newest = universe.bodies.last().unwrap().id;
        assert_eq!(newest, BodyId(3));
        assert_eq!(universe.aim().map(|aim| aim.body), Some(newest));
        assert!(!universe.is_aimed(first));
        // the merged body is held in place and the old one flies free
        assert_eq!(universe.bodies[newest].pos, Vector2::new(0.0, 0.0));
        assert!(universe.bodies[first].alive);
    }

    #[test]
    fn release_without_aim_is_a_no_op() {
        let mut universe = Universe::new();
        spawn(&mut universe, 0.0, 0.0);
        assert_eq!(universe.release(), None);
        universe.move_pointer(Vector2::new(5.0, 5.0));
        assert_eq!(universe.aim(), None);
    }
}
