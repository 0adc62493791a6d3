use log::LevelFilter;

/// Install the stderr logger. `RUST_LOG`, when set, wins over `--debug`.
pub fn init(debug: bool) {
    env_logger::Builder::new()
        .filter_level(level(debug))
        .parse_default_env()
        .format_timestamp_millis()
        .init();
}

fn level(debug: bool) -> LevelFilter {
    if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}
