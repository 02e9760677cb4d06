//=========================================================================
// Platform Bridge Interface
//=========================================================================
//
// Messages sent by the input-translation layer into the engine, and the
// sending handle it uses.
//
// Architecture:
//   input layer ──InputSender::send──> bounded channel ──> InputCollector
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{Sender, TrySendError};
use log::warn;

//=== Internal Dependencies ===============================================

use crate::core::InitData;

//=== InputMessage ========================================================

/// Messages from the input layer to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum InputMessage {
    /// An event to dispatch through the event handler.
    Event {
        event_type: String,
        data: InitData,
    },

    /// The input layer is shutting down (window closed, Ctrl-C...).
    Quit,
}

//=== InputSender =========================================================

/// Clonable handle used by the input layer to reach the engine.
///
/// Sending never blocks. When the channel is full the message is dropped
/// and a warning is logged.
#[derive(Debug, Clone)]
pub struct InputSender {
    sender: Sender<InputMessage>,
}

impl InputSender {
    pub(crate) fn new(sender: Sender<InputMessage>) -> Self {
        Self { sender }
    }

    /// Queues an event for the next frame. Returns false if it was dropped.
    pub fn send(&self, event_type: &str, data: InitData) -> bool {
        self.push(InputMessage::Event {
            event_type: event_type.to_owned(),
            data,
        })
    }

    /// Asks the engine to stop.
    pub fn quit(&self) -> bool {
        self.push(InputMessage::Quit)
    }

    /// Sends a prebuilt message. Returns false if it was dropped.
    pub fn push(&self, message: InputMessage) -> bool {
        match self.sender.try_send(message) {
            Ok(()) => true,
            Err(TrySendError::Full(message)) => {
                warn!("Input channel full, dropping {:?}", message);
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
