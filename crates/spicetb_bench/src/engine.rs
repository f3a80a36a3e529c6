//! Seam to the external simulation engine.
//!
//! The engine is opaque: it accepts text commands, announces each run with a
//! list of result vectors, and hands over one sample batch at a time. Only
//! the command direction is modelled as a trait; the callbacks arrive as
//! calls on [`Session`](crate::session::Session).

use crate::error::BenchError;

/// A simulator that accepts text commands.
pub trait Engine {
    /// Submits one command, e.g. `run` or `circbyline .end`.
    fn send_command(&mut self, command: &str) -> Result<(), BenchError>;
}

impl<E: Engine + ?Sized> Engine for &mut E {
    fn send_command(&mut self, command: &str) -> Result<(), BenchError> {
        (**self).send_command(command)
    }
}

impl<E: Engine + ?Sized> Engine for Box<E> {
    fn send_command(&mut self, command: &str) -> Result<(), BenchError> {
        (**self).send_command(command)
    }
}

/// An engine that only records the commands it receives.
///
/// Useful for dry runs and for inspecting the generated circuit lines.
#[derive(Debug, Default, Clone)]
pub struct CommandLog {
    commands: Vec<String>,
}

impl CommandLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every command received so far.
    pub fn commands(&self) -> &[String] {
        &self.commands
    }
}

impl Engine for CommandLog {
    fn send_command(&mut self, command: &str) -> Result<(), BenchError> {
        self.commands.push(command.to_string());
        Ok(())
    }
}
