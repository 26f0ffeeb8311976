//! demo - Sample driver for persistent-red-black
//!
//! Usage:
//!   cargo run -p demo -- <scenario> [options]
//!
//! Every scenario builds trees, prints their items in ascending order and
//! validates the red-black invariants of the result.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use persistent_red_black::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "demo")]
#[command(about = "Sample driver for persistent red-black trees")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Delete an absent item from {1..7}
    Delete,
    /// Union of {1..7} and {1, 2, 3, 7, 11, 12, -1, 15}
    Union,
    /// Intersection of two overlapping sets
    Intersection,
    /// Subtract {1, 6, 7, 8, 9, 10, 4} from {1..7}
    Subtract,
    /// Insert a shuffled range one item at a time
    Sorted(SortedArgs),
    /// Run every scenario
    All(SortedArgs),
}

#[derive(Args, Clone)]
struct SortedArgs {
    /// Number of items to insert
    #[arg(long, default_value_t = 200_000)]
    size: u32,

    /// Seed for the shuffle (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Print every item of the final tree
    #[arg(long)]
    print: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "persistent_red_black=info,demo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Delete => verify_delete(),
        Commands::Union => verify_union(),
        Commands::Intersection => verify_intersection(),
        Commands::Subtract => verify_subtract(),
        Commands::Sorted(args) => verify_sorted(&args),
        Commands::All(args) => {
            verify_delete()?;
            verify_union()?;
            verify_intersection()?;
            verify_subtract()?;
            verify_sorted(&args)
        }
    }
}

fn build(items: &[i32]) -> RedBlackTree<i32> {
    items
        .iter()
        .fold(RedBlackTree::new(), |tree, &item| tree.upsert(item))
}

fn print_items(tree: &RedBlackTree<i32>) {
    let mut cursor = tree.cursor();
    while let Some(item) = cursor.element() {
        println!("{item}");
        cursor.advance();
    }
}

fn report(scenario: &str, tree: &RedBlackTree<i32>) -> anyhow::Result<()> {
    print_items(tree);
    tree.validate_invariants()
        .with_context(|| format!("{scenario} produced an invalid tree"))?;
    tracing::info!(scenario, items = tree.len(), "invariants hold");
    Ok(())
}

fn verify_delete() -> anyhow::Result<()> {
    let tree = build(&[1, 2, 3, 4, 5, 6, 7]).delete(&10);
    report("delete", &tree)
}

fn verify_union() -> anyhow::Result<()> {
    let left = build(&[1, 2, 3, 4, 5, 6, 7]);
    let right = build(&[1, 2, 3, 7, 11, 12, -1, 15]);
    report("union", &left.union(&right))
}

fn verify_intersection() -> anyhow::Result<()> {
    let left = build(&[1, 2, 3, 4, 5, 6, 7, 10, 0]);
    let right = build(&[11, 12, 13, 17, 11, 12, -1, 15, 10, 100, 2, 3]);
    report("intersection", &left.intersection(&right))
}

fn verify_subtract() -> anyhow::Result<()> {
    let left = build(&[1, 2, 3, 4, 5, 6, 7]);
    let right = build(&[1, 6, 7, 8, 9, 10, 4]);
    report("subtract", &left.subtract(&right))
}

fn verify_sorted(args: &SortedArgs) -> anyhow::Result<()> {
    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!(size = args.size, seed, "inserting shuffled items");

    let mut items: Vec<u32> = (0..args.size).collect();
    items.shuffle(&mut StdRng::seed_from_u64(seed));

    let tree: RedBlackTree<u32> = items.into_iter().collect();
    if args.print {
        for item in &tree {
            println!("{item}");
        }
    }

    anyhow::ensure!(
        tree.iter().copied().eq(0..args.size),
        "items are not in ascending order"
    );
    tree.validate_invariants()
        .context("sorted insertion produced an invalid tree")?;
    tracing::info!(scenario = "sorted", items = tree.len(), "invariants hold");
    Ok(())
}
