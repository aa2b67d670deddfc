//! A simulated machine for running the pendant without real hardware.
//!
//! Behaves roughly like a GRBL controller after power-on: it starts
//! alarm-locked, so motion is refused until the machine is homed (`$H`) or
//! unlocked (`$X`).  Every accepted call is logged.

use std::sync::Arc;

use pendant_core::{CapabilityError, ControlState, ControlStateListener, MachineHost};

pub struct SimulatedMachine {
    listener: Arc<dyn ControlStateListener>,
    position: [f64; 3],
    alarm_locked: bool,
    check_mode: bool,
}

impl SimulatedMachine {
    pub fn new(listener: Arc<dyn ControlStateListener>) -> Self {
        Self {
            listener,
            position: [0.0; 3],
            alarm_locked: true,
            check_mode: false,
        }
    }

    /// Report the machine as connected and idle.
    pub fn connect(&mut self) {
        tracing::info!("simulated machine connected");
        self.listener.control_state_changed(ControlState::CommIdle);
    }

    #[cfg(test)]
    fn position(&self) -> [f64; 3] {
        self.position
    }

    #[cfg(test)]
    fn is_alarm_locked(&self) -> bool {
        self.alarm_locked
    }

    #[cfg(test)]
    fn is_check_mode(&self) -> bool {
        self.check_mode
    }

    fn ensure_unlocked(&self) -> Result<(), CapabilityError> {
        if self.alarm_locked {
            return Err(CapabilityError::new(
                "alarm lock active, home ($H) or unlock ($X) first",
            ));
        }
        Ok(())
    }
}

impl MachineHost for SimulatedMachine {
    fn send_command(&mut self, command: &str) -> Result<(), CapabilityError> {
        // `$` system commands are accepted in alarm state, motion is not.
        if !command.trim_start().starts_with('$') {
            self.ensure_unlocked()?;
        }
        tracing::info!(command, check_mode = self.check_mode, "command received");
        Ok(())
    }

    fn adjust_manual_location(
        &mut self,
        dir_x: i32,
        dir_y: i32,
        dir_z: i32,
        step_size: f64,
    ) -> Result<(), CapabilityError> {
        self.ensure_unlocked()?;
        if self.check_mode {
            tracing::info!(dir_x, dir_y, dir_z, step_size, "jog checked, not moved");
            return Ok(());
        }

        for (axis, dir) in self.position.iter_mut().zip([dir_x, dir_y, dir_z]) {
            *axis += f64::from(dir) * step_size;
        }
        let [x, y, z] = self.position;
        tracing::info!(x, y, z, "jogged");
        Ok(())
    }

    fn home_machine(&mut self) -> Result<(), CapabilityError> {
        if self.check_mode {
            return Err(CapabilityError::new("cannot home in check mode"));
        }
        self.position = [0.0; 3];
        self.alarm_locked = false;
        tracing::info!("homed");
        Ok(())
    }

    fn clear_alarm_lock(&mut self) -> Result<(), CapabilityError> {
        self.alarm_locked = false;
        tracing::info!("alarm lock cleared");
        Ok(())
    }

    fn toggle_check_mode(&mut self) -> Result<(), CapabilityError> {
        self.check_mode = !self.check_mode;
        tracing::info!(enabled = self.check_mode, "check mode toggled");
        Ok(())
    }
}
