use clap::Parser;
use ctm_promote::cli::{self, Args};
use ctm_promote::logging;
use ctm_promote::Result;

fn main() -> Result<()> {
    let args = Args::parse();
    let _logging = logging::init(&args.command)?;
    cli::run(args)
}
