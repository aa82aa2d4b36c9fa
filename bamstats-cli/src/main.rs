mod sample;
mod stream;

use anyhow::Result;
use clap::{Arg, ArgAction, Command};

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const BIN_NAME: &str = "bamstats";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .author("Databio")
        .about("Sampled read-depth statistics for alignment files too large to scan.")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Log at debug level unless RUST_LOG says otherwise"),
        )
        .subcommand(sample::cli::create_sample_cli())
        .subcommand(stream::cli::create_stream_cli())
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();

    init_logging(matches.get_flag("verbose"));

    match matches.subcommand() {
        //
        // OFFLINE SAMPLING
        //
        Some((sample::cli::SAMPLE_CMD, matches)) => {
            sample::handlers::run_sample(matches)?;
        }

        //
        // LIVE STATISTICS STREAM
        //
        Some((stream::cli::STREAM_CMD, matches)) => {
            stream::handlers::run_stream(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::*;

    #[rstest]
    fn test_parser_is_consistent() {
        build_parser().debug_assert();
    }

    #[rstest]
    fn test_verbose_is_global() {
        let matches = build_parser()
            .try_get_matches_from([
                "bamstats",
                "sample",
                "--header",
                "h.txt",
                "--coverage",
                "c.txt",
                "--verbose",
            ])
            .unwrap();
        assert!(matches.get_flag("verbose"));
    }
}
