//! A [`Notifier`] that forwards notices into a Tokio channel.
//!
//! The engine calls notifiers synchronously from its loop. Hosts whose
//! message delivery is async (chat bridges, websockets) take the receiver
//! half and deliver from their own task.

use tokio::sync::mpsc;
use wayforge_protocol::{Notice, Notifier, ParticipantId};

/// Receiving half of a [`ChannelNotifier`].
pub type NoticeReceiver = mpsc::UnboundedReceiver<(ParticipantId, Notice)>;

/// Pushes every notice onto an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<(ParticipantId, Notice)>,
}

impl ChannelNotifier {
    /// Creates the notifier and the receiver the host reads from.
    pub fn channel() -> (Self, NoticeReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, participant: ParticipantId, notice: Notice) {
        if self.sender.send((participant, notice)).is_err() {
            tracing::trace!(%participant, "notice receiver gone, dropping notice");
        }
    }
}
