mod commands;
mod sink;
mod terminal;

use commands::{CommandLine, discover};
use lanscout_common::config::Config;
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();
    let cfg: Config = commands.config();

    logging::init_logging(commands.verbose, cfg.quiet);
    logging::install_panic_hook();
    print::banner(cfg.no_banner, cfg.quiet);

    discover::discover(&commands, &cfg).await
}
