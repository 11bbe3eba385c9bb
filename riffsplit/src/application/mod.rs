pub mod handlers;
pub mod layout;

use crate::presentation::cli::{Cli, Commands};
use riffsplit_core::error::Result;

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Split {
            input,
            out_dir,
            prefix,
            suffix,
            dry_run,
            json,
        } => handlers::handle_split(input, out_dir, prefix, suffix, dry_run, json),
        Commands::Inspect { input, full } => handlers::handle_inspect(input, full),
        Commands::Cues { input, json } => handlers::handle_cues(input, json),
        Commands::Rewrite { input, output } => handlers::handle_rewrite(input, output),
    }
}
