use std::path::Path;

use image::{imageops, ImageFormat, RgbaImage};
use winit::dpi::PhysicalSize;

use crate::error::OutputError;

/// 렌더링이 끝난 픽셀 버퍼를 받아 가는 쪽 (화면, 파일 등).
/// 픽셀은 0xAABBGGRR로 압축되어 있고 0번째 줄이 화면 아래쪽임.
pub trait FrameSink {
    fn present(&mut self, size: PhysicalSize<u32>, pixels: &[u32]);
}

/// 마지막으로 받은 프레임을 복사해 두는 sink
#[derive(Debug, Clone)]
pub struct FrameCapture {
    size: PhysicalSize<u32>,
    pixels: Vec<u32>,
    presented: u64,
}

impl Default for FrameCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSink for FrameCapture {
    fn present(&mut self, size: PhysicalSize<u32>, pixels: &[u32]) {
        self.size = size;
        self.pixels.clear();
        self.pixels.extend_from_slice(pixels);
        self.presented += 1;
    }
}

impl FrameCapture {
    pub fn new() -> Self {
        Self {
            size: PhysicalSize::new(0, 0),
            pixels: vec![],
            presented: 0,
        }
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        self.pixels.get((x + y * self.size.width) as usize).copied()
    }

    pub fn frames_presented(&self) -> u64 {
        self.presented
    }

    pub fn to_image(&self) -> Result<RgbaImage, OutputError> {
        if self.pixels.is_empty() {
            return Err(OutputError::Empty);
        }

        // 메모리 상에서 R, G, B, A 순서가 되도록 리틀 엔디안으로 맞춤
        let little_endian: Vec<u32> = self.pixels.iter().map(|pixel| pixel.to_le()).collect();
        let bytes = bytemuck::cast_slice::<u32, u8>(&little_endian).to_vec();

        let mut image = RgbaImage::from_raw(self.size.width, self.size.height, bytes).ok_or(
            OutputError::SizeMismatch {
                width: self.size.width,
                height: self.size.height,
            },
        )?;

        // 버퍼는 아래쪽 줄부터 시작하니 뒤집어서 저장
        imageops::flip_vertical_in_place(&mut image);
        Ok(image)
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), OutputError> {
        self.to_image()?.save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_keeps_latest_frame() {
        let mut capture = FrameCapture::new();
        capture.present(PhysicalSize::new(2, 1), &[1, 2]);
        capture.present(PhysicalSize::new(1, 1), &[3]);

        assert_eq!(capture.pixels(), &[3]);
        assert_eq!(capture.size(), PhysicalSize::new(1, 1));
        assert_eq!(capture.frames_presented(), 2);
        assert_eq!(capture.pixel(0, 0), Some(3));
        assert_eq!(capture.pixel(1, 0), None);
    }

    #[test]
    fn test_image_is_flipped_and_rgba_ordered() {
        let mut capture = FrameCapture::new();
        // 아래 줄: 빨강, 위 줄: 파랑
        capture.present(PhysicalSize::new(1, 2), &[0xFF0000FF, 0xFFFF0000]);

        let image = capture.to_image().unwrap();
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 255, 255]);
        assert_eq!(image.get_pixel(0, 1).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_empty_capture_has_no_image() {
        assert!(matches!(
            FrameCapture::new().to_image(),
            Err(OutputError::Empty)
        ));
    }
}
