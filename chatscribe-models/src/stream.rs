//! Stream duplication.
//!
//! [`tee`] splits one [`ChatStream`] into two independently consumable
//! copies. A pump task drains the source and forwards every item to both
//! copies over unbounded channels, so a slow or abandoned consumer never
//! applies backpressure to the other one.

use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::debug;

use crate::Error;
use crate::providers::ChatStream;

/// Split `source` into a primary and a secondary copy.
///
/// The primary copy yields the source items unchanged. The secondary copy
/// yields the same chunks; since errors are not `Clone`, an error is
/// forwarded to it as [`Error::Stream`] carrying the original message.
///
/// Must be called within a tokio runtime.
pub fn tee(mut source: ChatStream) -> (ChatStream, ChatStream) {
    let (primary_tx, primary_rx) = mpsc::unbounded_channel();
    let (secondary_tx, secondary_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let mut primary_open = true;
        let mut secondary_open = true;

        while let Some(item) = source.next().await {
            let copy = match &item {
                Ok(chunk) => Ok(chunk.clone()),
                Err(e) => Err(Error::Stream(e.to_string())),
            };

            if secondary_open && secondary_tx.send(copy).is_err() {
                secondary_open = false;
            }
            if primary_open && primary_tx.send(item).is_err() {
                debug!("Primary stream copy dropped, continuing to drain source");
                primary_open = false;
            }
            if !primary_open && !secondary_open {
                break;
            }
        }
    });

    (
        Box::pin(UnboundedReceiverStream::new(primary_rx)),
        Box::pin(UnboundedReceiverStream::new(secondary_rx)),
    )
}
