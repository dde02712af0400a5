//! `roci-stream replay`: run a recorded capture through the reducer.

use std::path::Path;
use std::sync::{Arc, Mutex};

use futures::StreamExt;
use tokio::io::AsyncBufReadExt;
use tokio_stream::wrappers::LinesStream;

use crate::config::ReducerConfig;
use crate::error::{ReducerError, Result};
use crate::reducer::{Announcement, ReducerHandles, RunStateReducer};
use crate::session::{RunSession, SubmissionContext};
use crate::stream::drive_frames;
use crate::types::Message;

use super::ReplayArgs;

/// Id of the placeholder message a replay starts from when no seed is given.
const PLACEHOLDER_ID: &str = "pending";

pub async fn handle_replay(args: ReplayArgs) -> Result<()> {
    let config = ReducerConfig::resolve(args.config.as_deref())?;
    let seed = match &args.seed {
        Some(path) => load_seed(path).await?,
        None => vec![Message::new(PLACEHOLDER_ID)],
    };

    let list = Arc::new(Mutex::new(seed));
    let get = {
        let list = list.clone();
        Arc::new(move || lock(&list).clone())
    };
    let set = {
        let list = list.clone();
        Arc::new(move |next: Vec<Message>| *lock(&list) = next)
    };
    let announce = Arc::new(|announcement: Announcement| {
        tracing::info!(message = %announcement.message, "announce");
    });
    let handles = ReducerHandles::new(get, set).with_announcer(announce);

    let session = RunSession::new().with_submission(SubmissionContext {
        parent_message_id: args.parent_message_id.clone(),
        conversation_id: args.conversation_id.clone(),
    });
    let mut reducer = RunStateReducer::new(config, handles).with_session(session);

    let file = tokio::fs::File::open(&args.path).await?;
    let lines = LinesStream::new(tokio::io::BufReader::new(file).lines())
        .map(|line| line.map_err(ReducerError::from))
        .boxed();
    let summary = drive_frames(&mut reducer, lines).await;
    reducer.dispose();

    let messages = lock(&list).clone();
    let rendered = if args.pretty {
        serde_json::to_string_pretty(&messages)?
    } else {
        serde_json::to_string(&messages)?
    };
    println!("{rendered}");
    eprintln!(
        "{} events: {} published, {} recorded, {} skipped",
        summary.events, summary.published, summary.recorded, summary.skipped
    );
    Ok(())
}

async fn load_seed(path: &Path) -> Result<Vec<Message>> {
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&raw)?)
}

fn lock(list: &Mutex<Vec<Message>>) -> std::sync::MutexGuard<'_, Vec<Message>> {
    list.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
