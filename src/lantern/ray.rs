use nalgebra::{Point3, Unit, Vector3};

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Unit<Vector3<f32>>,
}

impl Ray {
    pub fn new(origin: Point3<f32>, direction: Unit<Vector3<f32>>) -> Self {
        Self { origin, direction }
    }

    /// 빔 시작점에서 `distance`만큼 진행한 지점
    pub fn at(&self, distance: f32) -> Point3<f32> {
        self.origin + self.direction.as_ref() * distance
    }
}
