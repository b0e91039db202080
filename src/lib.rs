pub mod app;
pub mod camera;
pub mod error;
pub mod input;
pub mod lantern;
pub mod util;

pub use app::Session;
pub use camera::Camera;
pub use error::{OutputError, SceneError};
pub use input::{InputState, Movement};
pub use lantern::image::{FrameCapture, FrameSink};
pub use lantern::ray::Ray;
pub use lantern::scene::{Material, Scene, Sphere};
pub use lantern::{HitPayload, Lantern, Settings, Tracer};
