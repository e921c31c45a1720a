#![no_main]
use libfuzzer_sys::fuzz_target;

const SUBCOMMANDS: [&str; 4] = ["compress", "decompress", "config", ""];

fuzz_target!(|data: &[u8]| {
    let Some((&pick, rest)) = data.split_first() else {
        return;
    };
    let mut args: Vec<String> = Vec::new();
    let sub = SUBCOMMANDS[pick as usize % SUBCOMMANDS.len()];
    if !sub.is_empty() {
        args.push(sub.to_string());
    }
    args.extend(
        String::from_utf8_lossy(rest)
            .split_whitespace()
            .take(24)
            .map(str::to_string),
    );
    oxiflate::cli::fuzz_try_parse_args(&args);
});
