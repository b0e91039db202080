use thiserror::Error;

/// Scene 편집/불러오기 과정에서 불변 조건이 깨졌을 때
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("sphere {sphere} references material {index}, but the scene only has {materials} materials")]
    UnknownMaterial {
        sphere: usize,
        index: usize,
        materials: usize,
    },
    #[error("sphere {sphere} has invalid radius {radius}")]
    InvalidRadius { sphere: usize, radius: f32 },
    #[error("sphere {0} does not exist")]
    UnknownSphere(usize),
    #[error("failed to read scene file")]
    Io(#[from] std::io::Error),
    #[error("failed to parse scene description")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("no frame has been presented yet")]
    Empty,
    #[error("pixel buffer does not fit a {width}x{height} image")]
    SizeMismatch { width: u32, height: u32 },
    #[error(transparent)]
    Image(#[from] image::ImageError),
}
