//! Ultimate tic-tac-toe engine CLI
//!
//! `uttt best` scores a position and prints the best moves; `uttt selfplay`
//! lets the engine play both sides to the end.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::EnvFilter;

use uttt::board::Move;
use uttt::rules::meta_winning_line;
use uttt::store::JsonLinesStore;
use uttt::{BestMoves, Engine, EngineConfig, GameState, SearchObserver, TracingObserver};

#[derive(Parser)]
#[command(name = "uttt", version, about = "Ultimate tic-tac-toe search engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Score every legal move of a position and pick one of the best
    Best(SearchArgs),
    /// Let the engine play both sides until the game ends
    Selfplay(SearchArgs),
}

impl Command {
    fn args(&self) -> &SearchArgs {
        match self {
            Command::Best(args) | Command::Selfplay(args) => args,
        }
    }
}

#[derive(Args)]
struct SearchArgs {
    /// Starting position as `<81 cells>/<legal boards or *>/<X|O>`
    #[arg(long)]
    state: Option<GameState>,

    /// Plies searched below each candidate move
    #[arg(long, conflicts_with = "unbounded")]
    max_depth: Option<u32>,

    /// Search every line to the end of the game
    #[arg(long)]
    unbounded: bool,

    /// JSON-lines file to load the cache from and save it to
    #[arg(long)]
    cache: Option<PathBuf>,

    /// Score candidate moves in parallel
    #[arg(long)]
    parallel: bool,

    /// Seed for breaking ties between equal moves
    #[arg(long)]
    seed: Option<u64>,

    /// JSON engine configuration; flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Trace every visited node and cutoff
    #[arg(short, long)]
    verbose: bool,
}

impl SearchArgs {
    fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => EngineConfig::default(),
        };
        if self.unbounded {
            config.max_depth = None;
        } else if let Some(depth) = self.max_depth {
            config.max_depth = Some(depth);
        }
        config.parallel |= self.parallel;
        config.verbose |= self.verbose;
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.validate()?;
        Ok(config)
    }

    fn store(&self) -> Option<JsonLinesStore> {
        self.cache.clone().map(JsonLinesStore::new)
    }
}

/// Progress bar over the candidates of one move selection.
struct ProgressObserver {
    bar: ProgressBar,
}

impl ProgressObserver {
    fn new() -> Result<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} candidates")?
                .progress_chars("=>-"),
        );
        Ok(Self { bar })
    }

    fn begin(&self, total: usize) {
        self.bar.reset();
        self.bar.set_length(total as u64);
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl SearchObserver for ProgressObserver {
    fn on_candidate_scored(&self, _done: usize, _total: usize) {
        self.bar.inc(1);
    }

    fn on_node(&self, mv: Move, depth: u32) {
        TracingObserver.on_node(mv, depth);
    }

    fn on_prune(&self, mv: Move, depth: u32) {
        TracingObserver.on_prune(mv, depth);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.command.args().verbose {
        "info,uttt=trace"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Command::Best(args) => run_best(args),
        Command::Selfplay(args) => run_selfplay(args),
    }
}

/// Load the cache if one is configured.
fn open_session(args: &SearchArgs) -> Result<(Engine, Option<JsonLinesStore>)> {
    let engine = Engine::new(args.engine_config()?)?;
    let store = args.store();
    if let Some(store) = &store {
        let loaded = engine.load_cache(store);
        info!(entries = loaded, path = %store.path().display(), "cache ready");
    }
    Ok((engine, store))
}

/// Save the cache if one is configured, with a progress bar.
fn close_session(engine: &Engine, store: Option<&JsonLinesStore>) -> Result<()> {
    let Some(store) = store else {
        return Ok(());
    };
    let snapshot = engine.searcher().table().snapshot();
    let bar = ProgressBar::new(snapshot.len() as u64);
    store
        .save_chunked(&snapshot, |written, _| bar.set_position(written as u64))
        .with_context(|| format!("saving cache {}", store.path().display()))?;
    bar.finish_and_clear();
    Ok(())
}

fn select(
    engine: &mut Engine,
    state: &GameState,
    progress: &ProgressObserver,
) -> Result<BestMoves> {
    progress.begin(state.legal_moves().len());
    let best = engine.choose_move(state, progress);
    progress.finish();
    Ok(best?)
}

fn run_best(args: &SearchArgs) -> Result<()> {
    let state = args.state.clone().unwrap_or_default();
    let (mut engine, store) = open_session(args)?;
    let progress = ProgressObserver::new()?;

    println!("{state}\n");
    let best = select(&mut engine, &state, &progress)?;

    let exact = if best.definite { "exact" } else { "estimate" };
    println!("best score: {} ({exact})", best.score);
    println!("tied moves:");
    for (board, cells) in &best.tied {
        let cells: Vec<String> = cells.iter().map(u8::to_string).collect();
        println!("  board {board}: cells {}", cells.join(" "));
    }
    println!("choice: {}", best.choice);
    println!(
        "nodes: {}  tt hits: {:.1}%  time: {} ms",
        best.stats.nodes,
        best.stats.tt_hit_rate(),
        best.elapsed_ms
    );

    close_session(&engine, store.as_ref())
}

fn run_selfplay(args: &SearchArgs) -> Result<()> {
    let mut state = args.state.clone().unwrap_or_default();
    let (mut engine, store) = open_session(args)?;
    let progress = ProgressObserver::new()?;

    let mut ply = 1;
    while !state.is_terminal() {
        let best = select(&mut engine, &state, &progress)?;
        println!(
            "{ply:>3}. {} plays {}  score {:+}  ({} tied, {} nodes, {} ms)",
            state.to_move(),
            best.choice,
            best.score,
            best.tie_count(),
            best.stats.nodes,
            best.elapsed_ms
        );
        state = state.play(best.choice)?;
        ply += 1;
    }

    println!("\n{state}\n");
    match (state.winner(), meta_winning_line(state.boards())) {
        (Some(winner), Some([a, b, c])) => println!("{winner} wins on boards {a}, {b}, {c}"),
        _ => println!("draw"),
    }

    close_session(&engine, store.as_ref())
}
