use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::Confirm;
use kanban_board::{
    BoardSnapshot, BoardStore, CardId, CardStatus, CardUpdate, ClientConfig, DragLocation,
    DragOutcome, DragResult, HttpCardRepository, KanbanError, NewCard,
};
use std::{path::PathBuf, sync::Arc};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kanban")]
#[command(version, about = "Kanban board client for a remote card API")]
struct Cli {
    /// Config file (defaults to <config dir>/kanban/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// API base URL, overriding config and environment
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the board, one column per status
    List,
    /// Create a card in TODO
    Add {
        title: String,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        image: Option<String>,
    },
    /// Edit a card; omitted fields keep their current value
    Edit {
        id: CardId,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        image: Option<String>,
        #[arg(short, long)]
        status: Option<CardStatus>,
    },
    /// Move a card to a column, as if dragged there
    Move {
        id: CardId,
        status: CardStatus,
        /// Position within the target column (defaults to the bottom)
        #[arg(long)]
        index: Option<usize>,
    },
    /// Delete a card
    Rm {
        id: CardId,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ClientConfig::load_from(Some(path)),
        None => ClientConfig::load(),
    }
    .context("failed to load configuration")?;
    if let Some(api_url) = cli.api_url {
        config = config.with_api_url(api_url);
    }

    let repository = Arc::new(HttpCardRepository::new(&config)?);
    let store = BoardStore::new(repository);

    match run(&store, cli.command).await {
        Ok(()) => Ok(()),
        Err(err) => {
            eprintln!("Error: {}", err.user_message());
            std::process::exit(1);
        }
    }
}

async fn run(store: &BoardStore<HttpCardRepository>, command: Commands) -> Result<(), KanbanError> {
    match command {
        Commands::List => {
            store.reload().await?;
            print_board(&store.snapshot());
        }
        Commands::Add {
            title,
            description,
            image,
        } => {
            let card = store
                .create_card(NewCard {
                    title,
                    description,
                    img_url: image,
                })
                .await?;
            println!("Created card {} in {}", card.id, card.status.title());
        }
        Commands::Edit {
            id,
            title,
            description,
            image,
            status,
        } => {
            store.reload().await?;
            let snapshot = store.snapshot();
            let card = snapshot
                .board
                .get(id)
                .ok_or_else(|| KanbanError::CardNotFound(id.to_string()))?;

            let mut update = CardUpdate::from_card(card);
            if let Some(title) = title {
                update.title = title;
            }
            if let Some(description) = description {
                update.description = Some(description);
            }
            if let Some(image) = image {
                update.img_url = Some(image);
            }
            if let Some(status) = status {
                update.status = status;
            }

            store.update_card(id, update).await?;
            println!("Updated card {}", id);
        }
        Commands::Move { id, status, index } => {
            store.reload().await?;
            let drag = drag_to(&store.snapshot(), id, status, index)?;
            match store.apply_drag(drag).await? {
                DragOutcome::Unchanged => println!("Card {} is already there", id),
                DragOutcome::Reordered => println!("Reordered card {} in {}", id, status.title()),
                DragOutcome::Moved { card_id, status } => {
                    println!("Moved card {} to {}", card_id, status.title())
                }
                DragOutcome::RolledBack { card_id, reason } => {
                    return Err(KanbanError::Request(format!(
                        "could not move card {}: {}",
                        card_id, reason
                    )));
                }
            }
        }
        Commands::Rm { id, yes } => {
            let confirmed = yes
                || Confirm::new()
                    .with_prompt(format!("Delete card {}? This cannot be undone.", id))
                    .default(false)
                    .interact()
                    .unwrap_or(false);

            if !confirmed {
                println!("Delete cancelled");
                return Ok(());
            }

            store.delete_card(id).await?;
            println!("Deleted card {}", id);
        }
    }
    Ok(())
}

/// Builds the drag gesture that takes card `id` to `status` at `index`
fn drag_to(
    snapshot: &BoardSnapshot,
    id: CardId,
    status: CardStatus,
    index: Option<usize>,
) -> Result<DragResult, KanbanError> {
    let card = snapshot
        .board
        .get(id)
        .ok_or_else(|| KanbanError::CardNotFound(id.to_string()))?;
    let source_index = snapshot
        .board
        .column(card.status)
        .position(|c| c.id == id)
        .unwrap_or(0);

    let column_len = snapshot.board.column(status).count();
    let last = if card.status == status {
        column_len.saturating_sub(1)
    } else {
        column_len
    };
    let index = index.map_or(last, |i| i.min(last));

    Ok(DragResult::new(
        id,
        DragLocation::new(card.status, source_index),
        DragLocation::new(status, index),
    ))
}

fn print_board(snapshot: &BoardSnapshot) {
    for column in snapshot.columns() {
        println!("{} ({})", column.title, column.cards.len());
        for card in &column.cards {
            let id = format!("#{}", card.id);
            match &card.description {
                Some(description) => println!("  {:<6} {} - {}", id, card.title, description),
                None => println!("  {:<6} {}", id, card.title),
            }
        }
        println!();
    }
}
