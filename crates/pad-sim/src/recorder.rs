use std::collections::VecDeque;
use std::sync::Arc;

use anyhow::Result;
use pad_fc::actuation::Actuator;
use pad_proto::{AttitudeCommand, Command, VelocityCommand};
use parking_lot::Mutex;

/// One recorded actuator call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Call {
    Send(Command),
    Land,
}

#[derive(Debug, Default)]
struct LogInner {
    calls: Vec<Call>,
    land_results: VecDeque<bool>,
    link_down: bool,
}

/// Actuator that only records what it was asked to do.
///
/// Land answers come from a script and default to `true` once it runs dry.
/// Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct CommandLog {
    inner: Arc<Mutex<LogInner>>,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_land_results(self, results: impl IntoIterator<Item = bool>) -> Self {
        self.inner.lock().land_results = results.into_iter().collect();
        self
    }

    /// Make every send fail after recording it.
    pub fn set_link_down(&self, down: bool) {
        self.inner.lock().link_down = down;
    }

    /// Every call in order, land requests included.
    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().calls.clone()
    }

    /// Motion demands only, in order.
    pub fn commands(&self) -> Vec<Command> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Send(cmd) => Some(*cmd),
                Call::Land => None,
            })
            .collect()
    }

    pub fn land_calls(&self) -> usize {
        self.inner.lock().calls.iter().filter(|c| **c == Call::Land).count()
    }

    pub fn motion_commands(&self) -> Vec<Command> {
        self.commands().into_iter().filter(Command::is_motion).collect()
    }

    fn push(&self, call: Call) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.calls.push(call);
        if inner.link_down {
            anyhow::bail!("link down");
        }
        Ok(())
    }
}

impl Actuator for CommandLog {
    fn send_velocity(&mut self, cmd: VelocityCommand) -> Result<()> {
        self.push(Call::Send(Command::Velocity(cmd)))
    }

    fn send_attitude(&mut self, cmd: AttitudeCommand) -> Result<()> {
        self.push(Call::Send(Command::Attitude(cmd)))
    }

    fn set_zero_velocity(&mut self) -> Result<()> {
        self.push(Call::Send(Command::ZeroVelocity))
    }

    fn land(&mut self) -> Result<bool> {
        self.push(Call::Land)?;
        Ok(self.inner.lock().land_results.pop_front().unwrap_or(true))
    }
}
