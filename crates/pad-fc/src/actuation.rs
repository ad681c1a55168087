use anyhow::Result;
use pad_proto::{AttitudeCommand, VelocityCommand};

/// The vehicle-side command sink.
///
/// Sends are fire-and-forget: an `Ok` means the command left this process,
/// not that the vehicle executed it. Only [`Actuator::land`] reports an
/// outcome, `Ok(true)` once touchdown is confirmed.
pub trait Actuator: Send {
    fn send_velocity(&mut self, cmd: VelocityCommand) -> Result<()>;

    fn send_attitude(&mut self, cmd: AttitudeCommand) -> Result<()>;

    fn set_zero_velocity(&mut self) -> Result<()> {
        self.send_velocity(VelocityCommand::ZERO)
    }

    fn land(&mut self) -> Result<bool>;
}

impl<A: Actuator + ?Sized> Actuator for Box<A> {
    fn send_velocity(&mut self, cmd: VelocityCommand) -> Result<()> {
        (**self).send_velocity(cmd)
    }

    fn send_attitude(&mut self, cmd: AttitudeCommand) -> Result<()> {
        (**self).send_attitude(cmd)
    }

    fn set_zero_velocity(&mut self) -> Result<()> {
        (**self).set_zero_velocity()
    }

    fn land(&mut self) -> Result<bool> {
        (**self).land()
    }
}
