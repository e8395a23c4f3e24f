// THEORY:
// `EnigoInjector` is the OS-backed `PointerInjector`. Every call becomes one
// relative mouse-move event handed to the platform input queue through `enigo`.
// Errors from the platform are surfaced as `InjectionError` so the actuator's
// failure policy can act on them.

use crate::core_modules::pointer_actuator::PointerInjector;
use crate::error::InjectionError;
use enigo::{Coordinate, Enigo, Mouse, Settings};

pub struct EnigoInjector {
    enigo: Enigo,
}

impl EnigoInjector {
    pub fn new() -> Result<Self, InjectionError> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|err| InjectionError::Unavailable(err.to_string()))?;
        Ok(Self { enigo })
    }
}

impl PointerInjector for EnigoInjector {
    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<(), InjectionError> {
        self.enigo
            .move_mouse(dx, dy, Coordinate::Rel)
            .map_err(|err| InjectionError::Rejected {
                dx,
                dy,
                reason: err.to_string(),
            })
    }
}
