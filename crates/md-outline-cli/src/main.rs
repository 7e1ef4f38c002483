use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use md_outline_config::{Config, Viewer};
use md_outline_engine::{
    ContentNode, LogNotifier, Notifier, PageCommands, Presenter, TraversalLimits, build_forest,
    convert_to_outline, io, tree_to_markdown_with,
};
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

mod viewer;

use viewer::{PlainPresenter, StderrNotifier, TuiPresenter};

#[derive(Parser)]
#[command(name = "md-outline", version, about = "Convert between Markdown and outliner blocks")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert Markdown into tab-indented outline text
    Outline {
        /// Markdown file (stdin when omitted)
        file: Option<PathBuf>,
    },
    /// Rebuild the block tree described by outline text
    Tree {
        /// Outline file (stdin when omitted)
        file: Option<PathBuf>,
        /// Print the tree as JSON instead of an indented preview
        #[arg(long)]
        json: bool,
    },
    /// Flatten a JSON block forest into Markdown
    Flatten {
        /// JSON file holding an array of blocks (stdin when omitted)
        file: Option<PathBuf>,
        #[arg(long)]
        max_depth: Option<usize>,
    },
    /// Run a command on the current page of a JSON block store
    Page {
        #[command(flatten)]
        options: PageOptions,
        #[command(subcommand)]
        action: PageAction,
    },
}

#[derive(Args)]
struct PageOptions {
    /// Block store file (defaults to `store_path` from the config file)
    #[arg(long)]
    store: Option<PathBuf>,
    /// Page to work on instead of the store's current page
    #[arg(long)]
    page: Option<String>,
    /// Print results instead of opening the terminal viewer
    #[arg(long)]
    plain: bool,
    #[arg(long)]
    max_depth: Option<usize>,
}

#[derive(Subcommand)]
enum PageAction {
    /// Convert the page's text to outline form
    Convert,
    /// Export the page's blocks as flat Markdown
    Export,
    /// Replace the page's blocks with the tree from an outline file
    Replace {
        /// Outline text to materialise
        #[arg(long)]
        outline: PathBuf,
    },
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Outline { file } => {
            let markdown = read_input(file.as_deref())?;
            println!("{}", convert_to_outline(&markdown));
        }
        Command::Tree { file, json } => {
            let outline = read_input(file.as_deref())?;
            let forest = build_forest(&outline);
            if json {
                println!("{}", serde_json::to_string_pretty(&forest)?);
            } else {
                print_forest(&forest);
            }
        }
        Command::Flatten { file, max_depth } => {
            let json = read_input(file.as_deref())?;
            let forest: Vec<ContentNode> =
                serde_json::from_str(&json).context("Expected a JSON array of blocks")?;
            let limits = max_depth.map(TraversalLimits::new).unwrap_or_default();
            print!("{}", tree_to_markdown_with(&forest, limits));
        }
        Command::Page { options, action } => return run_page(options, action),
    }

    Ok(ExitCode::SUCCESS)
}

fn run_page(options: PageOptions, action: PageAction) -> Result<ExitCode> {
    let config = Config::load_or_default()
        .with_context(|| format!("Failed to load {}", Config::config_path().display()))?;

    let Some(store_path) = options.store.or(config.store_path) else {
        bail!(
            "No block store given; pass --store or set store_path in {}",
            Config::config_path().display()
        );
    };
    let mut store = io::load_store(&store_path)?;

    if let Some(page) = &options.page
        && !store.open(page)
    {
        bail!("Page '{page}' not found in {}", store_path.display());
    }

    let limits = TraversalLimits::new(options.max_depth.unwrap_or(config.max_depth));
    let mut presenter: Box<dyn Presenter> = if options.plain || config.viewer == Viewer::Plain {
        Box::new(PlainPresenter)
    } else {
        Box::new(TuiPresenter)
    };
    // Piped or redirected stderr goes through the logger instead
    let notifier: &dyn Notifier = if std::io::stderr().is_terminal() {
        &StderrNotifier
    } else {
        &LogNotifier
    };

    let mut commands =
        PageCommands::new(&mut store, presenter.as_mut(), notifier).with_limits(limits);
    let succeeded = match action {
        PageAction::Convert => commands.convert_to_outline().is_ok(),
        PageAction::Export => commands.export_markdown().is_ok(),
        PageAction::Replace { outline } => {
            let outline = io::read_file(&outline)?;
            let succeeded = commands.replace_with_outline(&outline).is_ok();
            // Blocks created before a failure stay, so persist either way
            io::save_store(&store_path, &store)?;
            succeeded
        }
    };

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => Ok(io::read_file(path)?),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn print_forest(forest: &[ContentNode]) {
    let mut stack: Vec<(&ContentNode, usize)> = forest.iter().rev().map(|n| (n, 0)).collect();
    while let Some((node, depth)) = stack.pop() {
        let indent = "  ".repeat(depth);
        for (i, line) in node.content.lines().enumerate() {
            let bullet = if i == 0 { "• " } else { "  " };
            println!("{indent}{bullet}{line}");
        }
        stack.extend(node.children.iter().rev().map(|c| (c, depth + 1)));
    }
}
