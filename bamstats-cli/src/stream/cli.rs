use clap::{Arg, Command, value_parser};

pub use bamstats_broker::consts::STREAM_CMD;

pub fn create_stream_cli() -> Command {
    Command::new(STREAM_CMD)
        .author("Databio")
        .about("Stream sampled statistics from a backend, one JSON line per event.")
        .arg(
            Arg::new("url")
                .long("url")
                .short('u')
                .required(true)
                .help("URL of the BAM or CRAM file"),
        )
        .arg(
            Arg::new("index-url")
                .long("index-url")
                .help("URL of the index if it isn't next to the alignment file"),
        )
        .arg(
            Arg::new("intervals-url")
                .long("intervals-url")
                .help("URL of a BED-like file of target regions to sample from"),
        )
        .arg(
            Arg::new("backend")
                .long("backend")
                .short('b')
                .help("Backend base URL (default: $BAMSTATS_BACKEND or http://localhost:4000)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("TOML file with backend settings; flags take precedence"),
        )
        .arg(
            Arg::new("sample-more")
                .long("sample-more")
                .value_parser(value_parser!(u32))
                .default_value("0")
                .help("How many times to grow the sample after each stream completes"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_parser(value_parser!(u64))
                .help("Seed for reproducible samples"),
        )
}
