use std::env;
use std::process;

fn main() {
    process::exit(basec::cli::run(env::args().skip(1)));
}
