fn main() {
    std::process::exit(resgen_cli::run_cli(std::env::args().collect()));
}
