use std::fs;
use std::path::Path;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::SceneError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    pub spheres: Vec<Sphere>,
    pub materials: Vec<Material>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sphere {
    pub center: Vector3<f32>,
    pub radius: f32,
    pub material_index: usize,
}

impl Default for Sphere {
    fn default() -> Self {
        Self {
            center: Vector3::zeros(),
            radius: 1.0,
            material_index: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub albedo: Vector3<f32>,
    // 아직 반사 방향 계산에 쓰이지 않음
    pub roughness: f32,
    pub metallic: f32,
    pub emission_color: Vector3<f32>,
    pub emission_power: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            albedo: Vector3::new(1.0, 1.0, 1.0),
            roughness: 1.0,
            metallic: 0.0,
            emission_color: Vector3::zeros(),
            emission_power: 0.0,
        }
    }
}

impl Material {
    pub fn emission(&self) -> Vector3<f32> {
        self.emission_color * self.emission_power
    }
}

impl Scene {
    /// 기본 데모 씬: 초록 구, 그 아래 파란 바닥, 멀리 떠 있는 주황색 광원
    pub fn sample() -> Self {
        let green = Material {
            albedo: Vector3::new(0.05, 0.65, 0.05),
            roughness: 0.0,
            ..Default::default()
        };
        let blue = Material {
            albedo: Vector3::new(0.2, 0.3, 1.0),
            roughness: 0.1,
            ..Default::default()
        };
        let light_albedo = Vector3::new(1.0, 0.55, 0.05);
        let light = Material {
            albedo: light_albedo,
            roughness: 0.0,
            emission_color: light_albedo,
            emission_power: 13.5,
            ..Default::default()
        };

        Self {
            materials: vec![green, blue, light],
            spheres: vec![
                Sphere {
                    center: Vector3::zeros(),
                    radius: 1.0,
                    material_index: 0,
                },
                Sphere {
                    center: Vector3::new(81.0, 28.0, -100.0),
                    radius: 26.0,
                    material_index: 2,
                },
                Sphere {
                    center: Vector3::new(0.0, -101.0, 0.0),
                    radius: 100.0,
                    material_index: 1,
                },
            ],
        }
    }

    pub fn from_json(source: &str) -> Result<Self, SceneError> {
        let scene: Scene = serde_json::from_str(source)?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SceneError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    /// 구를 검사한 뒤 추가하고 그 인덱스를 돌려줌
    pub fn add_sphere(&mut self, sphere: Sphere) -> Result<usize, SceneError> {
        let index = self.spheres.len();
        self.check_sphere(index, &sphere)?;
        self.spheres.push(sphere);
        Ok(index)
    }

    pub fn set_sphere_material(
        &mut self,
        sphere: usize,
        material_index: usize,
    ) -> Result<(), SceneError> {
        if material_index >= self.materials.len() {
            return Err(SceneError::UnknownMaterial {
                sphere,
                index: material_index,
                materials: self.materials.len(),
            });
        }

        let target = self
            .spheres
            .get_mut(sphere)
            .ok_or(SceneError::UnknownSphere(sphere))?;
        target.material_index = material_index;
        Ok(())
    }

    /// 렌더러는 모든 구의 재질 인덱스가 유효하다고 가정함. 외부에서 만든 씬은 이걸로 확인할 것.
    pub fn validate(&self) -> Result<(), SceneError> {
        self.spheres
            .iter()
            .enumerate()
            .try_for_each(|(index, sphere)| self.check_sphere(index, sphere))
    }

    fn check_sphere(&self, index: usize, sphere: &Sphere) -> Result<(), SceneError> {
        if !(sphere.radius.is_finite() && sphere.radius > 0.0) {
            return Err(SceneError::InvalidRadius {
                sphere: index,
                radius: sphere.radius,
            });
        }

        if sphere.material_index >= self.materials.len() {
            return Err(SceneError::UnknownMaterial {
                sphere: index,
                index: sphere.material_index,
                materials: self.materials.len(),
            });
        }

        Ok(())
    }
}
