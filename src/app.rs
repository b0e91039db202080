use std::time::Instant;

use log::{debug, trace};
use winit::dpi::PhysicalSize;

use crate::camera::Camera;
use crate::input::InputState;
use crate::lantern::image::FrameSink;
use crate::lantern::scene::Scene;
use crate::lantern::Lantern;

/// 씬, 카메라, 렌더러를 하나씩 가지고 프레임마다 순서대로 돌려줌.
/// 씬 편집은 `render` 호출 사이에만 해야 함.
pub struct Session {
    pub scene: Scene,
    pub camera: Camera,
    pub renderer: Lantern,
    last_render_time: f32,
}

impl Session {
    pub fn new(scene: Scene) -> Self {
        Self::with_camera(scene, Camera::default())
    }

    pub fn with_camera(scene: Scene, camera: Camera) -> Self {
        Self {
            scene,
            camera,
            renderer: Lantern::new(),
            last_render_time: 0.0,
        }
    }

    /// 카메라가 움직였으면 누적을 처음부터 다시 시작함
    pub fn update(&mut self, time_step: f32, input: &InputState) -> bool {
        let moved = self.camera.update(time_step, input);
        if moved {
            trace!("camera moved, restarting accumulation");
            self.renderer.reset_frame_index();
        }
        moved
    }

    /// 한 프레임을 렌더링하고 걸린 시간(ms)을 돌려줌
    pub fn render<S: FrameSink + ?Sized>(
        &mut self,
        viewport: PhysicalSize<u32>,
        sink: &mut S,
    ) -> f32 {
        let timer = Instant::now();

        self.renderer.resize(viewport);
        self.camera.resize(viewport);
        self.renderer.render(&self.scene, &self.camera, sink);

        self.last_render_time = timer.elapsed().as_secs_f32() * 1000.0;
        self.last_render_time
    }

    pub fn reset_accumulation(&mut self) {
        debug!("accumulation reset requested");
        self.renderer.reset_frame_index();
    }

    pub fn set_accumulate(&mut self, accumulate: bool) {
        self.renderer.settings.accumulate = accumulate;
    }

    pub fn last_render_time(&self) -> f32 {
        self.last_render_time
    }
}
