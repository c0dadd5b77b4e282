//! Questline upload tool: writes one stage of a quest to the store.

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use clap::Parser;
use questline_core::ids::{QuestId, StageId};
use questline_core::quest::Stage;
use questline_store::{QuestRecord, QuestStorage, SqliteKeyValueStore, StageRecord};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Upload a quest stage.
#[derive(Debug, Parser)]
#[command(name = "questline-upload", version, about)]
struct Args {
    /// Target quest id.
    #[arg(long)]
    quest: String,

    /// Stage id; defaults to the current UTC timestamp so stages are
    /// appended in upload order.
    #[arg(long)]
    stage: Option<String>,

    /// Path of a media file shown with the question.
    #[arg(long)]
    media: Option<PathBuf>,

    /// Question text.
    #[arg(long)]
    question: String,

    /// Semicolon-separated accepted answers.
    #[arg(long)]
    answers: String,

    /// SQLite connection URL.
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Delete every existing stage of the quest first.
    #[arg(long)]
    replace: bool,
}

fn split_answers(raw: &str) -> Vec<&str> {
    raw.split(';').collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .compact()
        .init();

    let args = Args::parse();

    let quest_id = QuestId::parse(args.quest.as_str())?;
    let stage_id = match &args.stage {
        Some(raw) => StageId::parse(raw.as_str())?,
        None => StageId::timestamped(Utc::now(), 0),
    };

    let mut stage = Stage::new(args.question.as_str(), split_answers(&args.answers))?;
    if let Some(path) = &args.media {
        let media = tokio::fs::read(path).await?;
        info!(path = %path.display(), bytes = media.len(), "media file read");
        stage = stage.with_media(media);
    }

    let store = SqliteKeyValueStore::connect(&args.database_url).await?;
    let storage = QuestStorage::new(Arc::new(store));

    if args.replace {
        let removed = storage.delete_quest(&quest_id).await?;
        info!(quest_id = %quest_id, removed, "existing quest removed");
    }

    storage
        .store_quest(&QuestRecord {
            quest_id: quest_id.clone(),
            stages: vec![StageRecord {
                stage_id: stage_id.clone(),
                stage,
            }],
        })
        .await?;

    info!(quest_id = %quest_id, stage_id = %stage_id, "stage uploaded");
    Ok(())
}
