use cgmath::*;
use rand::Rng;
use std::{
    f64::consts::PI,
    fmt,
    ops::{Index, IndexMut},
};

pub const DENSITY: f64 = 5.52e3;
pub const SPAWN_RADIUS: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::opaque(0, 0, 0);
    pub const WHITE: Rgba = Rgba::opaque(255, 255, 255);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn random(rng: &mut impl Rng) -> Self {
        Self::opaque(
            rng.gen_range(0..255),
            rng.gen_range(0..255),
            rng.gen_range(0..255),
        )
    }

    /// Channel-wise sum of two colors. Channels wrap on overflow.
    pub fn blend(self, other: Rgba) -> Self {
        Self::opaque(
            self.r.wrapping_add(other.r),
            self.g.wrapping_add(other.g),
            self.b.wrapping_add(other.b),
        )
    }

    pub fn to_vector(self) -> Vector3<f32> {
        Vector3 {
            x: self.r as f32 / 255.0,
            y: self.g as f32 / 255.0,
            z: self.b as f32 / 255.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyId(pub usize);

impl BodyId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub id: BodyId,
    pub pos: Vector2<f64>,
    pub vel: Vector2<f64>,
    pub radius: f64,
    pub color: Rgba,
    pub alive: bool,
}

impl Body {
    pub fn spawn(id: BodyId, pos: Vector2<f64>, color: Rgba) -> Self {
        Self {
            id,
            pos,
            vel: Vector2::zero(),
            radius: SPAWN_RADIUS,
            color,
            alive: true,
        }
    }

    pub fn mass(&self) -> f64 {
        4.0 / 3.0 * PI * self.radius.powi(3) * DENSITY
    }

    pub fn distance_to(&self, target: Vector2<f64>) -> f64 {
        self.direction_to(target).magnitude()
    }

    /// Displacement from this body to `target`. Deliberately not normalized.
    pub fn direction_to(&self, target: Vector2<f64>) -> Vector2<f64> {
        target - self.pos
    }

    /// Body left behind when `p` swallows `t`.
    ///
    /// Only `t`'s velocity is mass weighted, so momentum is not conserved.
    /// The result sits where `p` was.
    pub fn merge(p: &Body, t: &Body, id: BodyId) -> Body {
        let p_mass = p.mass();
        let t_mass = t.mass();
        Body {
            id,
            pos: p.pos,
            vel: p.vel + t.vel * t_mass / (t_mass + p_mass),
            radius: (p.radius.powi(2) + t.radius.powi(2)).sqrt(),
            color: p.color.blend(t.color),
            alive: true,
        }
    }
}

/// Append-only arena of bodies. A body's id is its index, dead bodies keep their slot.
#[derive(Debug, Clone, Default)]
pub struct BodyList {
    bodies: Vec<Body>,
}

impl BodyList {
    pub fn new() -> Self {
        Self { bodies: vec![] }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn next_id(&self) -> BodyId {
        BodyId(self.bodies.len())
    }

    pub fn push(&mut self, build: impl FnOnce(BodyId) -> Body) -> BodyId {
        let id = self.next_id();
        let body = build(id);
        debug_assert_eq!(body.id, id);
        self.bodies.push(body);
        id
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.0)
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(id.0)
    }

    pub fn last(&self) -> Option<&Body> {
        self.bodies.last()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Body> {
        self.bodies.iter()
    }

    pub fn alive(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter().filter(|body| body.alive)
    }

    pub fn alive_count(&self) -> usize {
        self.alive().count()
    }
}

impl Index<BodyId> for BodyList {
    type Output = Body;

    fn index(&self, id: BodyId) -> &Body {
        &self.bodies[id.0]
    }
}

impl IndexMut<BodyId> for BodyList {
    fn index_mut(&mut self, id: BodyId) -> &mut Body {
        &mut self.bodies[id.0]
    }
}
