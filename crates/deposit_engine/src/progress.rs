use std::sync::mpsc;

use crate::DepositEvent;

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: DepositEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn emit(&self, _event: DepositEvent) {}
}

pub struct ChannelProgressSink {
    tx: mpsc::Sender<DepositEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<DepositEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: DepositEvent) {
        let _ = self.tx.send(event);
    }
}
