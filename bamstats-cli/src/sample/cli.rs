use clap::{Arg, Command, value_parser};

pub use bamstats_sampling::consts::SAMPLE_CMD;

pub fn create_sample_cli() -> Command {
    Command::new(SAMPLE_CMD)
        .author("Databio")
        .about("Sample windows offline from a saved header and coverage dump, written as BED.")
        .arg(
            Arg::new("header")
                .long("header")
                .required(true)
                .help("Alignment header text (@SQ lines), optionally gzipped"),
        )
        .arg(
            Arg::new("coverage")
                .long("coverage")
                .required(true)
                .help("Coverage dump as returned by a read-depth endpoint, optionally gzipped"),
        )
        .arg(
            Arg::new("intervals")
                .long("intervals")
                .help("BED-like file of target regions to sample from instead of whole references"),
        )
        .arg(
            Arg::new("multiplier")
                .long("multiplier")
                .short('m')
                .value_parser(value_parser!(u32))
                .help("Sample size multiplier; values above 1 give more and wider windows"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_parser(value_parser!(u64))
                .help("Seed for reproducible samples"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("BED file to write windows to (default: stdout)"),
        )
}
