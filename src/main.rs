//! Command line entry point for chainsurf
//!
//! ```text
//! chainsurf <SYMBOL> [--plot-only]
//! ```
//!
//! Scrapes the option chain of SYMBOL into `data/<SYMBOL>chain.csv` and
//! renders one surface per configured metric into `img/<SYMBOL><mode>.png`.
//! With `--plot-only` the existing CSV is plotted without scraping.

use chainsurf::assembler::scrape_chain;
use chainsurf::config::Config;
use chainsurf::error::{ChainError, Result};
use chainsurf::models::Symbol;
use chainsurf::utils::polars_utils::load_chain_csv;
use chainsurf::utils::{plot_chain_surface, PlottersRenderer};
use tracing::{error, info};

struct Invocation {
    symbol: Symbol,
    plot_only: bool,
}

fn parse_args(args: &[String]) -> Result<Invocation> {
    let mut plot_only = false;
    let mut positional = Vec::new();
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--plot-only" => plot_only = true,
            _ => positional.push(arg.as_str()),
        }
    }

    if positional.len() != 1 {
        return Err(ChainError::InvalidSymbol(
            "Only one ticker argument required [EX. chainsurf btc or eth]".to_string(),
        ));
    }

    Ok(Invocation {
        symbol: Symbol::parse(positional[0])?,
        plot_only,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    config.init_logging()?;

    let args: Vec<String> = std::env::args().collect();
    let invocation = parse_args(&args)?;
    let symbol = invocation.symbol.as_str();
    config.output.ensure_directories()?;

    let csv_path = config.output.chain_path(symbol);
    if invocation.plot_only {
        info!("Plot only, reusing {}", csv_path.display());
    } else {
        let table = scrape_chain(&config, symbol, &csv_path).await?;
        info!("Scraped {} rows for {}", table.len(), symbol);
    }

    let chain = load_chain_csv(&csv_path)?;
    let renderer = PlottersRenderer::default();
    let mut failures = 0;
    for mode in &config.output.modes {
        let image_path = config.output.image_path(symbol, mode);
        if let Err(e) = plot_chain_surface(&renderer, symbol, &chain, mode, &image_path) {
            error!("Failed to plot {} {}: {}", symbol, mode, e);
            failures += 1;
        }
    }

    info!(
        "Finished {}: {} of {} surfaces rendered",
        symbol,
        config.output.modes.len() - failures,
        config.output.modes.len()
    );
    Ok(())
}
