use cgmath::{BaseFloat, InnerSpace, Vector2, Zero};

pub trait VectorExt {
    /// Unit vector in the same direction, or the zero vector when there is no direction.
    fn normalize_or_zero(self) -> Self;
}

impl<S: BaseFloat> VectorExt for Vector2<S> {
    fn normalize_or_zero(self) -> Self {
        let magnitude2 = self.magnitude2();
        if magnitude2 > S::zero() && magnitude2.is_finite() {
            self / magnitude2.sqrt()
        } else {
            Vector2::zero()
        }
    }
}
