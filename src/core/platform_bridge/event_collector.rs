//=========================================================================
// Event Collector
//=========================================================================
//
// Engine-side end of the input channel, with bounded draining and
// shutdown detection.
//
// Architecture:
//   Receiver<InputMessage> → collect_frame() → pending events → TickControl
//
// Bounded draining keeps a flooding input layer from starving the frame.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{Receiver, TryRecvError};
use log::{info, warn};

//=== Internal Dependencies ===============================================

use super::InputMessage;
use crate::core::InitData;

//=== TickControl =========================================================

/// Frame loop control signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Exit,
}

//=== InputCollector ======================================================

/// Pending input event: type and description.
pub(crate) type PendingEvent = (String, InitData);

/// Collects input messages once per frame.
pub(crate) struct InputCollector {
    receiver: Receiver<InputMessage>,
    events: Vec<PendingEvent>,
}

impl InputCollector {
    /// Upper bound of messages drained by one `collect_frame`.
    pub(crate) const MAX_MESSAGES_PER_FRAME: usize = 100;

    /// Creates a collector over the receiving end of the input channel.
    pub(crate) fn new(receiver: Receiver<InputMessage>) -> Self {
        Self {
            receiver,
            events: Vec::with_capacity(16),
        }
    }

    /// Collects pending messages (bounded to prevent starvation).
    ///
    /// Returns `Exit` on `Quit` or once every sender is gone. Events read
    /// before the exit signal stay available through `take_events`.
    pub(crate) fn collect_frame(&mut self) -> TickControl {
        self.events.clear();
        let mut drained = 0;

        while drained < Self::MAX_MESSAGES_PER_FRAME {
            match self.receiver.try_recv() {
                Ok(InputMessage::Event { event_type, data }) => {
                    self.events.push((event_type, data));
                    drained += 1;
                }
                Ok(InputMessage::Quit) => {
                    info!("Input layer requested quit");
                    return TickControl::Exit;
                }
                Err(TryRecvError::Disconnected) => {
                    info!("Input channel disconnected");
                    return TickControl::Exit;
                }
                Err(TryRecvError::Empty) => break,
            }
        }

        if drained >= Self::MAX_MESSAGES_PER_FRAME {
            warn!("Input queue backlog: drained {} messages this frame", drained);
        }

        TickControl::Continue
    }

    /// Returns the events collected this frame.
    pub(crate) fn events(&self) -> &[PendingEvent] {
        &self.events
    }

    /// Takes the events collected this frame, leaving an empty list.
    pub(crate) fn take_events(&mut self) -> Vec<PendingEvent> {
        std::mem::take(&mut self.events)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
