fn main() {
    #[cfg(feature = "cli")]
    oxiflate::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("oxiflate: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
