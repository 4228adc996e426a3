use clap::Parser;
use pic_mcc::cli::{self, Cli};

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    cli::run(cli);
}
