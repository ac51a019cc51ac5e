use winit::{
    event::{ElementState, KeyEvent},
    keyboard::{KeyCode, PhysicalKey},
};

#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceId {
    Winit(winit::event::DeviceId),
}

#[non_exhaustive]
#[derive(Debug, Clone, Copy)]
pub enum DeviceEvent<'a> {
    Key(&'a KeyEvent),
}

impl DeviceEvent<'_> {
    /// The key code of a fresh key press, ignoring releases, auto-repeat and
    /// keys winit could not identify.
    pub fn pressed_key(&self) -> Option<KeyCode> {
        match self {
            DeviceEvent::Key(event) if !event.repeat => {
                pressed_code(event.physical_key, event.state)
            }
            DeviceEvent::Key(_) => None,
        }
    }
}

pub fn pressed_code(key: PhysicalKey, state: ElementState) -> Option<KeyCode> {
    match (key, state) {
        (PhysicalKey::Code(code), ElementState::Pressed) => Some(code),
        _ => None,
    }
}
