use std::ops::Range;

use nalgebra::{Unit, Vector3, Vector4};
use rand::Rng;

pub fn random_vec<G: Rng + ?Sized>(rng: &mut G, range: Range<f32>) -> Vector3<f32> {
    Vector3::new(
        rng.gen_range(range.clone()),
        rng.gen_range(range.clone()),
        rng.gen_range(range),
    )
}

/// 단위 구 표면 위의 균일한 무작위 방향.
/// 정육면체에서 뽑은 점 중 구 안에 들어온 것만 골라 정규화함.
pub fn random_unit_vector<G: Rng + ?Sized>(rng: &mut G) -> Unit<Vector3<f32>> {
    loop {
        let candidate = random_vec(rng, -1.0..1.0);
        let length_squared = candidate.norm_squared();
        if length_squared > 1e-12 && length_squared <= 1.0 {
            return Unit::new_normalize(candidate);
        }
    }
}

/// [0, 1] 범위의 RGBA를 0xAABBGGRR로 압축. 각 채널은 `channel * 255`를 버림한 값.
pub fn vec4_to_rgba(color: &Vector4<f32>) -> u32 {
    let r = (color.x * 255.0) as u8 as u32;
    let g = (color.y * 255.0) as u8 as u32;
    let b = (color.z * 255.0) as u8 as u32;
    let a = (color.w * 255.0) as u8 as u32;

    (a << 24) | (b << 16) | (g << 8) | r
}
