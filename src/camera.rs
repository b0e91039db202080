use log::debug;
use nalgebra::{
    Isometry3, Matrix4, Perspective3, Point3, Unit, UnitQuaternion, Vector2, Vector3, Vector4,
};
use rayon::prelude::*;
use winit::dpi::PhysicalSize;

use crate::input::{InputState, Movement};

const POINTER_SCALE: f32 = 0.002;

pub struct Camera {
    projection: Perspective3<f32>,
    inverse_projection: Matrix4<f32>,
    view: Isometry3<f32>,
    inverse_view: Isometry3<f32>,

    // 도(degree) 단위
    vertical_fov: f32,
    near: f32,
    far: f32,

    position: Point3<f32>,
    direction: Unit<Vector3<f32>>,

    // 픽셀 (x, y)의 광선 방향은 x + y * width 위치에 있음
    rays: Vec<Unit<Vector3<f32>>>,
    last_pointer: Option<Vector2<f32>>,
    cursor_grabbed: bool,

    viewport_size: PhysicalSize<u32>,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(45.0, 0.1, 100.0)
    }
}

impl Camera {
    /// 뷰포트 크기가 0x0인 상태로 만들어짐. 쓰기 전에 `resize` 필요.
    pub fn new(vertical_fov: f32, near: f32, far: f32) -> Self {
        let projection = Perspective3::new(1.0, vertical_fov.to_radians(), near, far);
        let position = Point3::new(6.5, 6.5, 25.0);
        let direction = -Vector3::z_axis();

        let mut to_return = Self {
            inverse_projection: projection.inverse(),
            projection,
            view: Isometry3::identity(),
            inverse_view: Isometry3::identity(),
            vertical_fov,
            near,
            far,
            position,
            direction,
            rays: vec![],
            last_pointer: None,
            cursor_grabbed: false,
            viewport_size: PhysicalSize::new(0, 0),
        };
        to_return.reevaluate_view();

        to_return
    }

    pub fn with_pose(mut self, position: Point3<f32>, direction: Vector3<f32>) -> Self {
        self.set_pose(position, direction);
        self
    }

    pub fn set_pose(&mut self, position: Point3<f32>, direction: Vector3<f32>) {
        self.position = position;
        self.direction = Unit::new_normalize(direction);

        self.reevaluate_view();
        self.reevaluate_rays();
    }

    /// 입력을 반영해 위치와 방향을 갱신함. 조금이라도 움직였으면 true.
    pub fn update(&mut self, time_step: f32, input: &InputState) -> bool {
        let pointer = input.pointer_position;
        let delta = self
            .last_pointer
            .map_or_else(Vector2::zeros, |last| (pointer - last) * POINTER_SCALE);
        self.last_pointer = Some(pointer);

        // 회전 중이 아니면 커서를 풀어줌. 이동은 계속 가능.
        self.cursor_grabbed = input.rotate_engaged;

        let up: Unit<Vector3<f32>> = Vector3::y_axis();
        let right = self.direction.cross(up.as_ref());
        let step = self.movement_speed() * time_step;
        let mut moved = false;

        for movement in Movement::ALL {
            if !input.is_held(movement) {
                continue;
            }

            let axis = match movement {
                Movement::Forward => self.direction.into_inner(),
                Movement::Backward => -self.direction.into_inner(),
                Movement::Left => -right,
                Movement::Right => right,
                Movement::Up => up.into_inner(),
                Movement::Down => -up.into_inner(),
            };
            self.position += axis * step;
            moved = true;
        }

        if input.rotate_engaged && delta != Vector2::zeros() {
            let pitch_delta = delta.y * self.rotation_speed();
            let yaw_delta = delta.x * self.rotation_speed();

            // 정확히 위/아래를 보고 있으면 오른쪽 축을 정할 수 없으니 yaw만 적용
            let pitch = Unit::try_new(right, 1e-6).map_or_else(UnitQuaternion::identity, |axis| {
                UnitQuaternion::from_axis_angle(&axis, -pitch_delta)
            });
            let yaw = UnitQuaternion::from_axis_angle(&up, -yaw_delta);

            self.direction = (pitch * yaw) * self.direction;
            self.direction.renormalize();
            moved = true;
        }

        if moved {
            self.reevaluate_view();
            self.reevaluate_rays();
        }

        moved
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if self.viewport_size == new_size {
            return;
        }

        debug!(
            "camera viewport {}x{} -> {}x{}",
            self.viewport_size.width, self.viewport_size.height, new_size.width, new_size.height
        );
        self.viewport_size = new_size;

        if new_size.width != 0 && new_size.height != 0 {
            self.reevaluate_projection();
        }
        self.reevaluate_rays();
    }

    pub fn rotation_speed(&self) -> f32 {
        0.3
    }

    pub fn movement_speed(&self) -> f32 {
        5.0
    }

    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    pub fn direction(&self) -> Unit<Vector3<f32>> {
        self.direction
    }

    pub fn ray_directions(&self) -> &[Unit<Vector3<f32>>] {
        &self.rays
    }

    pub fn viewport_size(&self) -> PhysicalSize<u32> {
        self.viewport_size
    }

    pub fn cursor_grabbed(&self) -> bool {
        self.cursor_grabbed
    }

    pub fn vertical_fov(&self) -> f32 {
        self.vertical_fov
    }

    pub fn projection(&self) -> &Matrix4<f32> {
        self.projection.as_matrix()
    }

    pub fn inverse_projection(&self) -> &Matrix4<f32> {
        &self.inverse_projection
    }

    pub fn view(&self) -> Matrix4<f32> {
        self.view.to_homogeneous()
    }

    pub fn inverse_view(&self) -> Matrix4<f32> {
        self.inverse_view.to_homogeneous()
    }

    fn reevaluate_projection(&mut self) {
        let aspect = self.viewport_size.width as f32 / self.viewport_size.height as f32;
        self.projection =
            Perspective3::new(aspect, self.vertical_fov.to_radians(), self.near, self.far);
        self.inverse_projection = self.projection.inverse();
    }

    fn reevaluate_view(&mut self) {
        let target = self.position + self.direction.into_inner();
        self.view = Isometry3::look_at_rh(&self.position, &target, &Vector3::y());
        self.inverse_view = self.view.inverse();
    }

    fn reevaluate_rays(&mut self) {
        let PhysicalSize { width, height } = self.viewport_size;
        if width == 0 || height == 0 {
            self.rays.clear();
            return;
        }

        let inverse_projection = self.inverse_projection;
        let inverse_view = self.inverse_view;

        let (width, height) = (width as usize, height as usize);

        self.rays = (0..width * height)
            .into_par_iter()
            .map(|index| {
                let x = index % width;
                let y = index / width;

                // 픽셀 모서리 기준으로 -1 ~ 1에 대응시킴
                let coord = Vector2::new(x as f32 / width as f32, y as f32 / height as f32) * 2.0
                    - Vector2::repeat(1.0);

                let target = inverse_projection * Vector4::new(coord.x, coord.y, 1.0, 1.0);
                let view_direction = (target.xyz() / target.w).normalize();

                // 방향 벡터라 이동은 빼고 회전만 적용됨
                Unit::new_normalize(inverse_view.transform_vector(&view_direction))
            })
            .collect();
    }
}
