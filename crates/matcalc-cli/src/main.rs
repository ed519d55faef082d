mod config;
mod console;
mod render;
mod repl;

use clap::{Parser, Subcommand};
use env_logger::Env;
use matcalc_engine::{Catalog, Detached, EvalOptions, Session};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "matcalc")]
#[command(about = "Matrix expression calculator", long_about = None)]
struct Cli {
    /// Evaluator settings as JSON (defaults to <config dir>/matcalc/config.json)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log what the evaluator is doing
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate expressions in order, sharing variables, and print each result
    Eval {
        #[arg(value_name = "EXPR", required = true)]
        expressions: Vec<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the built-in commands
    Commands,
    /// Start the interactive calculator (the default)
    Repl,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_env(Env::default().default_filter_or("warn"));
    if cli.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    let options = config::load(cli.config.as_deref())?;
    log::debug!("Evaluator options: {:?}", options);

    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Eval { expressions, json } => eval(&expressions, json, options),
        Commands::Commands => {
            print!("{}", render::catalog(Catalog::standard()?));
            Ok(())
        }
        Commands::Repl => repl::run(options),
    }
}

fn eval(expressions: &[String], json: bool, options: EvalOptions) -> anyhow::Result<()> {
    let mut session = Session::new(Detached, options);
    for source in expressions {
        let value = session
            .run(source)
            .map_err(|e| anyhow::anyhow!("{}", render::error_report(source, &e)))?;
        match (json, value) {
            (true, value) => println!("{}", serde_json::to_string(&value)?),
            (false, Some(value)) => println!("{}", render::value(&value)),
            (false, None) => {}
        }
    }
    Ok(())
}
