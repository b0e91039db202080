use log::{debug, trace, warn};
use nalgebra::{Point3, Unit, Vector3, Vector4};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;
use winit::dpi::PhysicalSize;

use crate::camera::Camera;
use crate::lantern::image::FrameSink;
use crate::lantern::ray::Ray;
use crate::lantern::scene::Scene;
use crate::util::{random_unit_vector, vec4_to_rgba};

pub mod image;
pub mod ray;
pub mod scene;

pub const BOUNCE_LIMIT: usize = 7;
pub const SKY_COLOR: [f32; 3] = [0.6, 0.7, 0.9];
const RAY_OFFSET: f32 = 0.0001;

pub struct Settings {
    pub accumulate: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self { accumulate: true }
    }
}

pub struct Lantern {
    size: PhysicalSize<u32>,
    image_data: Vec<u32>,
    accumulation: Vec<Vector4<f32>>,
    horizontal_iter: Vec<u32>,
    vertical_iter: Vec<u32>,
    frame_index: u32,
    pub settings: Settings,
}

impl Default for Lantern {
    fn default() -> Self {
        Self::new()
    }
}

impl Lantern {
    pub fn new() -> Self {
        Self {
            size: PhysicalSize::new(0, 0),
            image_data: vec![],
            accumulation: vec![],
            horizontal_iter: vec![],
            vertical_iter: vec![],
            frame_index: 1,
            settings: Default::default(),
        }
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if self.size == new_size {
            return;
        }

        debug!(
            "renderer buffers {}x{} -> {}x{}",
            self.size.width, self.size.height, new_size.width, new_size.height
        );

        let pixel_count = new_size.width as usize * new_size.height as usize;
        self.size = new_size;
        self.image_data = vec![0; pixel_count];
        self.accumulation = vec![Vector4::zeros(); pixel_count];
        self.horizontal_iter = (0..new_size.width).collect();
        self.vertical_iter = (0..new_size.height).collect();
        self.frame_index = 1;
    }

    pub fn reset_frame_index(&mut self) {
        self.frame_index = 1;
    }

    pub fn frame_index(&self) -> u32 {
        self.frame_index
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn image_data(&self) -> &[u32] {
        &self.image_data
    }

    pub fn render<S: FrameSink + ?Sized>(&mut self, scene: &Scene, camera: &Camera, sink: &mut S) {
        let width = self.size.width as usize;
        let pixel_count = self.image_data.len();

        // 카메라 광선 배열이 다른 크기로 만들어져 있으면 인덱스가 어긋남
        if camera.viewport_size() != self.size {
            warn!(
                "camera viewport {:?} does not match renderer {:?}, skipping frame",
                camera.viewport_size(),
                self.size
            );
            return;
        }

        if self.frame_index == 1 {
            self.accumulation.fill(Vector4::zeros());
        }

        if pixel_count != 0 {
            let tracer = Tracer::new(scene, camera, self.frame_index);
            let frame_index = self.frame_index as f32;
            let horizontal_iter = &self.horizontal_iter;

            // 각 픽셀은 자기 칸에만 쓰므로 줄 단위, 칸 단위로 나눠서 병렬 처리
            self.image_data
                .par_chunks_mut(width)
                .zip(self.accumulation.par_chunks_mut(width))
                .zip(self.vertical_iter.par_iter())
                .for_each(|((image_row, accumulation_row), &y)| {
                    image_row
                        .par_iter_mut()
                        .zip(accumulation_row.par_iter_mut())
                        .zip(horizontal_iter.par_iter())
                        .for_each(|((pixel, accumulated), &x)| {
                            *accumulated += tracer.per_pixel(x, y);

                            let average = *accumulated / frame_index;
                            *pixel = vec4_to_rgba(&average.map(|channel| channel.clamp(0.0, 1.0)));
                        });
                });
        }

        sink.present(self.size, &self.image_data);
        trace!("frame {} presented", self.frame_index);

        if self.settings.accumulate {
            self.frame_index += 1;
        } else {
            self.frame_index = 1;
        }
    }
}

/// 한 번의 렌더 동안 씬과 카메라를 읽기 전용으로 붙잡고 있음
pub struct Tracer<'a> {
    scene: &'a Scene,
    camera: &'a Camera,
    frame_index: u32,
}

impl<'a> Tracer<'a> {
    pub fn new(scene: &'a Scene, camera: &'a Camera, frame_index: u32) -> Self {
        Self {
            scene,
            camera,
            frame_index,
        }
    }

    // DirectX의 RayGen 쉐이더와 같음
    pub fn per_pixel(&self, x: u32, y: u32) -> Vector4<f32> {
        let index = (x + y * self.camera.viewport_size().width) as usize;

        // 같은 프레임 번호, 같은 픽셀이면 언제나 같은 경로가 나옴
        let seed = ((self.frame_index as u64) << 32) | index as u64;
        let mut rng = SmallRng::seed_from_u64(seed);

        let mut ray = Ray::new(self.camera.position(), self.camera.ray_directions()[index]);

        let mut light = Vector3::zeros();
        let mut throughput = Vector3::repeat(1.0);

        for _ in 0..BOUNCE_LIMIT {
            let Some(hit) = self.trace_ray(&ray) else {
                light += throughput.component_mul(&Vector3::from(SKY_COLOR));
                break;
            };

            let sphere = &self.scene.spheres[hit.object_index];
            let material = &self.scene.materials[sphere.material_index];

            throughput.component_mul_assign(&material.albedo);
            // 이전 경로의 throughput을 곱하지 않음
            light += material.emission().component_mul(&material.albedo);

            // 표면에 딱 붙은 점에서 다시 쏘면 자기 자신과 부딪히므로 법선 방향으로 살짝 띄움
            ray.origin = hit.world_position + hit.world_normal.as_ref() * RAY_OFFSET;

            // roughness, metallic은 아직 반영하지 않음
            let scatter = hit.world_normal.into_inner() + random_unit_vector(&mut rng).into_inner();
            ray.direction = Unit::try_new(scatter, 1e-8).unwrap_or(hit.world_normal);
        }

        Vector4::new(light.x, light.y, light.z, 1.0)
    }

    pub fn trace_ray(&self, ray: &Ray) -> Option<HitPayload> {
        let origin = ray.origin.coords;
        let direction = ray.direction.into_inner();

        let mut closest: Option<(usize, f32)> = None;
        for (index, sphere) in self.scene.spheres.iter().enumerate() {
            // O = 빔 시작, D = 빔 방향, C = 구 중심, r = 구 반지름
            // |O + tD - C|^2 = r^2 를 t에 대해 전개한 이차방정식
            let center = &sphere.center;

            let a = direction.dot(&direction);
            let b = 2.0 * (origin.dot(&direction) - center.dot(&direction));
            let c = origin.dot(&origin) - sphere.radius * sphere.radius + center.dot(center)
                - 2.0 * center.dot(&origin);

            // 방향이 0이거나 NaN이면 근을 구할 수 없음
            if !(a > f32::EPSILON) {
                continue;
            }

            let discriminant = b * b - 4.0 * a * c;
            if !(discriminant >= 0.0) {
                continue;
            }

            // 가까운 근만 봄. 구 안에서 출발한 빔은 그 구를 못 맞힘.
            let distance = (-b - discriminant.sqrt()) / (2.0 * a);
            if !(distance > 0.0 && distance.is_finite()) {
                continue;
            }

            if closest.map_or(true, |(_, previous)| distance < previous) {
                closest = Some((index, distance));
            }
        }

        closest.map(|(index, distance)| self.closest_hit(ray, distance, index))
    }

    fn closest_hit(&self, ray: &Ray, distance: f32, object_index: usize) -> HitPayload {
        let sphere = &self.scene.spheres[object_index];
        let world_position = ray.at(distance);
        let world_normal = Unit::new_normalize(world_position.coords - sphere.center);

        HitPayload {
            hit_distance: distance,
            world_position,
            world_normal,
            object_index,
        }
    }
}

// HitPayload는 빛의 경로에 대한 정보만 담고, 이를 이용해 색상을 알아내는건 나중에 함
#[derive(Debug, Clone, Copy)]
pub struct HitPayload {
    pub hit_distance: f32,
    pub world_position: Point3<f32>,
    pub world_normal: Unit<Vector3<f32>>,
    pub object_index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lantern::scene::{Material, Sphere};

    fn scene_with(spheres: Vec<Sphere>) -> Scene {
        Scene {
            spheres,
            materials: vec![Material::default()],
        }
    }

    fn sphere(center: Vector3<f32>, radius: f32) -> Sphere {
        Sphere {
            center,
            radius,
            material_index: 0,
        }
    }

    fn ray(origin: [f32; 3], direction: [f32; 3]) -> Ray {
        Ray::new(
            Point3::from(origin),
            Unit::new_normalize(Vector3::from(direction)),
        )
    }

    #[test]
    fn test_ray_pointing_away_misses() {
        let scene = scene_with(vec![sphere(Vector3::zeros(), 1.0)]);
        let camera = Camera::default();
        let tracer = Tracer::new(&scene, &camera, 1);

        assert!(tracer.trace_ray(&ray([0.0, 0.0, 5.0], [0.0, 0.0, 1.0])).is_none());
        assert!(tracer.trace_ray(&ray([0.0, 0.0, 5.0], [0.0, 1.0, 0.0])).is_none());
    }

    #[test]
    fn test_ray_at_center_hits_near_surface() {
        let scene = scene_with(vec![sphere(Vector3::new(1.0, 2.0, 3.0), 1.5)]);
        let camera = Camera::default();
        let tracer = Tracer::new(&scene, &camera, 1);

        let origin = [1.0, 2.0, 10.0];
        let hit = tracer
            .trace_ray(&ray(origin, [0.0, 0.0, -1.0]))
            .expect("should hit");

        assert!((hit.hit_distance - (7.0 - 1.5)).abs() < 1e-4);
        assert!((hit.world_position - Point3::new(1.0, 2.0, 4.5)).norm() < 1e-4);
        // 법선은 빔 방향과 평행(반대 방향)
        assert!((hit.world_normal.dot(&Vector3::new(0.0, 0.0, -1.0)) + 1.0).abs() < 1e-5);
        assert_eq!(hit.object_index, 0);
    }

    #[test]
    fn test_closest_of_overlapping_spheres() {
        let scene = scene_with(vec![
            sphere(Vector3::new(0.0, 0.0, -1.0), 2.0),
            sphere(Vector3::new(0.0, 0.0, 0.0), 2.0),
        ]);
        let camera = Camera::default();
        let tracer = Tracer::new(&scene, &camera, 1);

        let hit = tracer
            .trace_ray(&ray([0.0, 0.0, 10.0], [0.0, 0.0, -1.0]))
            .unwrap();
        assert!((hit.hit_distance - 8.0).abs() < 1e-4);
        assert_eq!(hit.object_index, 1);
    }

    #[test]
    fn test_origin_inside_sphere_misses() {
        let scene = scene_with(vec![sphere(Vector3::zeros(), 2.0)]);
        let camera = Camera::default();
        let tracer = Tracer::new(&scene, &camera, 1);

        assert!(tracer.trace_ray(&ray([0.0, 0.0, 0.0], [1.0, 0.0, 0.0])).is_none());
    }

    #[test]
    fn test_empty_scene_misses() {
        let scene = Scene::default();
        let camera = Camera::default();
        let tracer = Tracer::new(&scene, &camera, 1);

        assert!(tracer.trace_ray(&ray([0.0, 0.0, 0.0], [0.0, 0.0, -1.0])).is_none());
    }

    #[test]
    fn test_degenerate_direction_misses() {
        let scene = scene_with(vec![sphere(Vector3::zeros(), 1.0)]);
        let camera = Camera::default();
        let tracer = Tracer::new(&scene, &camera, 1);

        let broken = Ray::new(
            Point3::new(0.0, 0.0, 5.0),
            Unit::new_unchecked(Vector3::zeros()),
        );
        assert!(tracer.trace_ray(&broken).is_none());
    }

    #[test]
    fn test_resize_resets_frame_index() {
        let mut lantern = Lantern::new();
        lantern.resize(PhysicalSize::new(4, 3));
        assert_eq!(lantern.image_data().len(), 12);
        assert_eq!(lantern.horizontal_iter, vec![0, 1, 2, 3]);
        assert_eq!(lantern.vertical_iter, vec![0, 1, 2]);

        lantern.frame_index = 5;
        lantern.resize(PhysicalSize::new(4, 3));
        assert_eq!(lantern.frame_index(), 5);

        lantern.resize(PhysicalSize::new(2, 2));
        assert_eq!(lantern.frame_index(), 1);
        assert_eq!(lantern.accumulation.len(), 4);
    }

    #[test]
    fn test_mismatched_camera_skips_frame() {
        struct Counter(u32);
        impl FrameSink for Counter {
            fn present(&mut self, _: PhysicalSize<u32>, _: &[u32]) {
                self.0 += 1;
            }
        }

        let mut lantern = Lantern::new();
        lantern.resize(PhysicalSize::new(4, 4));
        let camera = Camera::default();
        let mut counter = Counter(0);

        lantern.render(&Scene::default(), &camera, &mut counter);
        assert_eq!(counter.0, 0);
        assert_eq!(lantern.frame_index(), 1);
    }

    // 원점을 여섯 방향에서 둘러싼 큰 구들. 원점 근처에서 출발한 빔은 어느 방향이든 구에 맞고
    // 하늘로 빠져나가지 못함.
    fn closed_room(material: Material) -> Scene {
        let offset = 10.5;
        let centers = [
            Vector3::new(offset, 0.0, 0.0),
            Vector3::new(-offset, 0.0, 0.0),
            Vector3::new(0.0, offset, 0.0),
            Vector3::new(0.0, -offset, 0.0),
            Vector3::new(0.0, 0.0, offset),
            Vector3::new(0.0, 0.0, -offset),
        ];

        Scene {
            spheres: centers.into_iter().map(|center| sphere(center, 10.0)).collect(),
            materials: vec![material],
        }
    }

    fn room_camera() -> Camera {
        let mut camera = Camera::default().with_pose(Point3::origin(), -Vector3::z());
        camera.resize(PhysicalSize::new(2, 2));
        camera
    }

    #[test]
    fn test_closed_room_stops_at_bounce_limit() {
        // emission * albedo = 1 이니 충돌 한 번마다 정확히 1씩 더해짐
        let scene = closed_room(Material {
            albedo: Vector3::repeat(0.5),
            emission_color: Vector3::repeat(2.0),
            emission_power: 1.0,
            ..Default::default()
        });
        let camera = room_camera();

        for frame_index in 1..=4 {
            let light = Tracer::new(&scene, &camera, frame_index).per_pixel(1, 1);
            let expected = BOUNCE_LIMIT as f32;
            assert_eq!(light, Vector4::new(expected, expected, expected, 1.0));
        }
    }

    #[test]
    fn test_emission_ignores_throughput() {
        // 몇 번째 충돌이든 같은 emission * albedo = (0.5, 1.0, 0.25)가 더해져야 함
        let scene = closed_room(Material {
            albedo: Vector3::new(0.5, 0.25, 1.0),
            emission_color: Vector3::new(1.0, 4.0, 0.25),
            emission_power: 1.0,
            ..Default::default()
        });
        let camera = room_camera();

        let light = Tracer::new(&scene, &camera, 1).per_pixel(1, 1);
        let bounces = BOUNCE_LIMIT as f32;
        assert_eq!(
            light,
            Vector4::new(0.5 * bounces, 1.0 * bounces, 0.25 * bounces, 1.0)
        );
    }
}
