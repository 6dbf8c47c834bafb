//! Plays French Tarot deals between bots and prints their outcome.

use clap::Parser;
use std::path::{Path, PathBuf};
use tarot_rs::agents::AgentTable;
use tarot_rs::config::{GameMode, TableConfig};
use tarot_rs::engine::Engine;
use tarot_rs::place::{Place, Team};
use tarot_rs::score::Score;
use tracing::info;

/// Give up a game if the bots keep passing.
const MAX_REDEALS: usize = 50;

#[derive(Parser)]
#[command(name = "tarot-rs")]
#[command(about = "French Tarot deals played by bots", version = tarot_rs::VERSION)]
struct Args {
    /// Number of players (3 to 5)
    #[arg(short, long, default_value_t = 4)]
    players: u8,

    /// Seed for the deals and the bots; random when omitted
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of deals to play
    #[arg(short, long, default_value_t = 1)]
    deals: usize,

    /// Table configuration (JSON); overrides --players and --deals
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the deal log here (one file per deal when several are played)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn log_path(base: &Path, deal: usize, deals: usize) -> PathBuf {
    if deals == 1 {
        return base.to_path_buf();
    }
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("deal");
    base.with_file_name(format!("{stem}-{deal}.json"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let seed = args.seed.unwrap_or_else(rand::random::<u64>);
    let cfg = match &args.config {
        Some(path) => TableConfig::load(path)?,
        None => {
            let mode = match args.deals {
                1 => GameMode::QuickDeal,
                deals => GameMode::SimpleTournament { deals },
            };
            TableConfig::new(args.players).with_seed(seed).with_mode(mode)
        }
    };
    let deals = cfg.mode.number_of_deals();
    let n = cfg.number_of_players;
    info!(players = n, deals, seed, "starting game");

    let mut engine = Engine::with_seed(seed);
    cfg.setup(&mut engine)?;
    engine.advance()?;
    let mut table = AgentTable::bots(n, seed);
    let mut score = Score::new(deals);
    let mut redeals = 0;

    while !score.is_finished() {
        engine.advance()?;
        let Some(points) = table.play_deal(&mut engine)? else {
            redeals += 1;
            if redeals >= MAX_REDEALS {
                return Err(format!("every player passed {redeals} times in a row").into());
            }
            println!("All players passed, new deal.");
            engine.advance()?;
            continue;
        };
        redeals = 0;
        let bid = *engine.bid();
        score.add_points(points, bid, n);
        let number = score.deal_counter();

        let log = engine.deal_log();
        println!("Deal {number}/{deals}");
        println!("{}", log.to_json_string()?);
        println!(
            "Taker: {} ({}), attack {} points, needed {}, {} wins",
            bid.taker.map_or("nobody", |p| p.name()),
            bid.contract,
            points.cards_points_attack(),
            points.points_to_do(),
            match points.winner() {
                Team::Attack => "attack",
                Team::Defense => "defense",
            },
        );
        let seats = points.seat_points(&bid, n);
        for (place, score) in Place::seats(n).map(|p| (p, seats[p.index()])) {
            println!("  {place}: {score:+}");
        }
        if let Some(base) = &args.output {
            let path = log_path(base, number, deals);
            log.save(&path)?;
            info!(path = %path.display(), "deal log saved");
        }
        engine.advance()?;
    }

    if deals > 1 {
        println!("Final ranking");
        for (rank, (place, total)) in score.podium().into_iter().enumerate() {
            println!("  {}. {place}: {total:+}", rank + 1);
        }
    }
    Ok(())
}
