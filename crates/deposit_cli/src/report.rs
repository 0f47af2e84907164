use deposit_engine::{DepositEvent, DepositOutcome, ProgressSink};
use deposit_logging::{deposit_debug, deposit_info, deposit_warn};

/// Mirrors engine progress into the log.
pub struct LogProgressSink;

impl ProgressSink for LogProgressSink {
    fn emit(&self, event: DepositEvent) {
        match event {
            DepositEvent::StageChanged(stage) => deposit_debug!("Stage: {}", stage),
            DepositEvent::Uploaded { bytes, status } => {
                deposit_info!("Uploaded {} bytes, server answered {}", bytes, status)
            }
            DepositEvent::ReceiptParsed { bag_id, .. } => {
                if let Some(bag_id) = bag_id {
                    deposit_debug!("Receipt entry id: {}", bag_id);
                }
            }
            DepositEvent::StateObserved { attempt, state } => {
                deposit_debug!("Poll {}: {}", attempt, state)
            }
        }
    }
}

/// Line printed on stdout for a published deposit: its final identifying URI.
pub fn outcome_line(outcome: &DepositOutcome) -> Option<String> {
    match &outcome.bag_id {
        Some(bag_id) => Some(bag_id.clone()),
        None => {
            deposit_warn!("Published statement carried no entry id");
            None
        }
    }
}
