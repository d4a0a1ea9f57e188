use std::sync::Arc;

use crossbeam_queue::ArrayQueue;

use crate::{envelope::GrainEnvelope, error::Error, parameters::GrainParameters};

// -------------------------------------------------------------------------------------------------

/// Parameter changes, sent from a [`GrainEngineHandle`] to a [`GrainEngine`](crate::GrainEngine).
///
/// Each message carries a complete group of values. Messages get applied at the start of the
/// next processed block, in the order they were sent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GrainEngineMessage {
    SetRate(f64),
    SetLoop { start: f64, end: f64 },
    SetFreqRange { lower: f64, upper: f64 },
    SetDurRange { lower: f64, upper: f64 },
    SetDispRange { lower: f64, upper: f64 },
    SetAmpRange { lower: f64, upper: f64 },
    SetPanRange { lower: f64, upper: f64 },
    SetEnvelope(GrainEnvelope),
    SetBufferRandomness(f64),
    SetBufferChannel(usize),
    SetParameters(GrainParameters),
}

// -------------------------------------------------------------------------------------------------

/// Change [`GrainEngine`](crate::GrainEngine) parameters from any thread.
///
/// Handles are `Send` and `Sync` so they can be sent across threads. Sending never blocks:
/// when the engine's message queue is full, the message is dropped and an error is returned.
#[derive(Clone)]
pub struct GrainEngineHandle {
    message_queue: Arc<ArrayQueue<GrainEngineMessage>>,
}

impl GrainEngineHandle {
    pub(crate) fn new(message_queue: Arc<ArrayQueue<GrainEngineMessage>>) -> Self {
        Self { message_queue }
    }

    /// Set the main playhead's position increment per sample.
    pub fn set_rate(&self, rate: f64) -> Result<(), Error> {
        self.send(GrainEngineMessage::SetRate(rate), "set_rate")
    }

    /// Set the loop region from relative positions in range `[0, 1]`.
    pub fn set_loop(&self, start: f64, end: f64) -> Result<(), Error> {
        self.send(GrainEngineMessage::SetLoop { start, end }, "set_loop")
    }

    /// Set the grain playback rate range.
    pub fn set_freq_range(&self, lower: f64, upper: f64) -> Result<(), Error> {
        self.send(
            GrainEngineMessage::SetFreqRange { lower, upper },
            "set_freq_range",
        )
    }

    /// Set the grain duration range in milliseconds.
    pub fn set_dur_range(&self, lower: f64, upper: f64) -> Result<(), Error> {
        self.send(
            GrainEngineMessage::SetDurRange { lower, upper },
            "set_dur_range",
        )
    }

    /// Set the range of the time between two grain spawns in milliseconds.
    pub fn set_disp_range(&self, lower: f64, upper: f64) -> Result<(), Error> {
        self.send(
            GrainEngineMessage::SetDispRange { lower, upper },
            "set_disp_range",
        )
    }

    /// Set the linear grain amplitude range.
    pub fn set_amp_range(&self, lower: f64, upper: f64) -> Result<(), Error> {
        self.send(
            GrainEngineMessage::SetAmpRange { lower, upper },
            "set_amp_range",
        )
    }

    /// Set the grain pan range.
    pub fn set_pan_range(&self, lower: f64, upper: f64) -> Result<(), Error> {
        self.send(
            GrainEngineMessage::SetPanRange { lower, upper },
            "set_pan_range",
        )
    }

    /// Set the envelope shape of new grains.
    pub fn set_envelope(&self, envelope: GrainEnvelope) -> Result<(), Error> {
        self.send(GrainEngineMessage::SetEnvelope(envelope), "set_envelope")
    }

    /// Set the amount of randomness in grain start positions.
    pub fn set_buffer_randomness(&self, amount: f64) -> Result<(), Error> {
        self.send(
            GrainEngineMessage::SetBufferRandomness(amount),
            "set_buffer_randomness",
        )
    }

    /// Set which channel of a multichannel sample buffer grains read from.
    pub fn set_buffer_channel(&self, channel: usize) -> Result<(), Error> {
        self.send(
            GrainEngineMessage::SetBufferChannel(channel),
            "set_buffer_channel",
        )
    }

    /// Replace all parameters at once.
    pub fn set_parameters(&self, parameters: GrainParameters) -> Result<(), Error> {
        self.send(
            GrainEngineMessage::SetParameters(parameters),
            "set_parameters",
        )
    }

    fn send(&self, message: GrainEngineMessage, message_name: &str) -> Result<(), Error> {
        if self.message_queue.push(message).is_err() {
            Err(Self::message_queue_error(message_name))
        } else {
            Ok(())
        }
    }

    fn message_queue_error(message_name: &str) -> Error {
        log::warn!("Grain engine's message queue is full. Failed to send a {message_name} message.");
        log::warn!("Increase the engine's message queue size to prevent this from happening...");
        Error::SendError("Grain engine queue is full".to_string())
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sending() {
        let queue = Arc::new(ArrayQueue::new(2));
        let handle = GrainEngineHandle::new(Arc::clone(&queue));
        assert!(handle.set_rate(0.5).is_ok());
        assert!(handle.clone().set_loop(0.1, 0.2).is_ok());
        assert!(matches!(
            handle.set_envelope(GrainEnvelope::Linear),
            Err(Error::SendError(_))
        ));
        assert_eq!(queue.pop(), Some(GrainEngineMessage::SetRate(0.5)));
        assert_eq!(
            queue.pop(),
            Some(GrainEngineMessage::SetLoop {
                start: 0.1,
                end: 0.2
            })
        );
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn handles_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GrainEngineHandle>();
    }
}
