//! Adapters between an async frame stream and the synchronous reducer.
//!
//! The transport owns connection handling; these helpers only pull frames in
//! order and hand each one to [`RunStateReducer::handle`].

use futures::stream::BoxStream;
use futures::{Stream, StreamExt};

use crate::error::Result;
use crate::protocol::{decode_frame, StreamEvent};
use crate::reducer::{Dispatch, RunStateReducer};

/// Decode a stream of raw frames into events. Blank frames are dropped.
pub fn decode_frames(
    frames: BoxStream<'static, Result<String>>,
) -> BoxStream<'static, Result<StreamEvent>> {
    let decoded = async_stream::stream! {
        let mut inner = std::pin::pin!(frames);
        while let Some(item) = inner.next().await {
            match item {
                Ok(raw) => {
                    if raw.trim().is_empty() {
                        continue;
                    }
                    yield decode_frame(&raw);
                }
                Err(e) => yield Err(e),
            }
        }
    };
    Box::pin(decoded)
}

/// Counts of what happened while driving a stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriveSummary {
    pub events: usize,
    pub published: usize,
    pub recorded: usize,
    pub skipped: usize,
}

impl DriveSummary {
    fn record(&mut self, dispatch: &Dispatch) {
        self.events += 1;
        match dispatch {
            Dispatch::Published => self.published += 1,
            Dispatch::Recorded => self.recorded += 1,
            Dispatch::Skipped(_) => self.skipped += 1,
        }
    }
}

/// Feed every event of `events` to `reducer`, in order, until the stream ends.
///
/// Stream errors (undecodable frames, transport hiccups) are counted as
/// skipped and do not stop the loop.
pub async fn drive<S>(reducer: &mut RunStateReducer, events: S) -> DriveSummary
where
    S: Stream<Item = Result<StreamEvent>>,
{
    let mut summary = DriveSummary::default();
    let mut events = std::pin::pin!(events);
    while let Some(item) = events.next().await {
        let dispatch = match item {
            Ok(event) => reducer.handle(event),
            Err(e) => {
                tracing::warn!(error = %e, "undecodable event skipped");
                Dispatch::Skipped(e)
            }
        };
        summary.record(&dispatch);
    }
    summary
}

/// Convenience: decode and drive raw frames.
pub async fn drive_frames(
    reducer: &mut RunStateReducer,
    frames: BoxStream<'static, Result<String>>,
) -> DriveSummary {
    drive(reducer, decode_frames(frames)).await
}
