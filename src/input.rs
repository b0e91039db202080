use nalgebra::Vector2;
use winit::event::{ElementState, KeyboardInput, MouseButton, VirtualKeyCode, WindowEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

impl Movement {
    pub const ALL: [Movement; 6] = [
        Movement::Forward,
        Movement::Backward,
        Movement::Left,
        Movement::Right,
        Movement::Up,
        Movement::Down,
    ];

    fn from_key(key: VirtualKeyCode) -> Option<Self> {
        match key {
            VirtualKeyCode::W => Some(Movement::Forward),
            VirtualKeyCode::S => Some(Movement::Backward),
            VirtualKeyCode::A => Some(Movement::Left),
            VirtualKeyCode::D => Some(Movement::Right),
            VirtualKeyCode::Space => Some(Movement::Up),
            VirtualKeyCode::LControl => Some(Movement::Down),
            _ => None,
        }
    }
}

/// 한 프레임 동안 카메라가 읽는 입력 상태
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputState {
    pub pointer_position: Vector2<f32>,
    // 보통 마우스 오른쪽 버튼을 누르고 있을 때
    pub rotate_engaged: bool,
    held: [bool; 6], // Movement 순서: W S A D SPACE CTRL
}

impl InputState {
    pub fn is_held(&self, movement: Movement) -> bool {
        self.held[movement as usize]
    }

    pub fn set_held(&mut self, movement: Movement, held: bool) {
        self.held[movement as usize] = held;
    }

    pub fn release_all(&mut self) {
        self.held = [false; 6];
        self.rotate_engaged = false;
    }

    // true: 입력을 처리했음
    // false: 카메라와 관계없는 이벤트
    pub fn handle_event(&mut self, event: &WindowEvent<'_>) -> bool {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer_position = Vector2::new(position.x as f32, position.y as f32);
                true
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Right,
                ..
            } => {
                self.rotate_engaged = matches!(state, ElementState::Pressed);
                true
            }
            WindowEvent::KeyboardInput {
                input:
                    KeyboardInput {
                        state,
                        virtual_keycode: Some(key),
                        ..
                    },
                ..
            } => match Movement::from_key(*key) {
                Some(movement) => {
                    self.set_held(movement, matches!(state, ElementState::Pressed));
                    true
                }
                None => false,
            },
            // 창이 포커스를 잃으면 떼는 이벤트가 안 올 수도 있음
            WindowEvent::Focused(false) => {
                self.release_all();
                true
            }
            _ => false,
        }
    }
}
