mod cli;
mod input;
mod pattern;
mod tz;

fn main() {
    if let Err(e) = cli::cli_main() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
