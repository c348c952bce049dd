use std::env;
use std::process;

fn main() {
    gradepoint::logging::init();

    let args: Vec<String> = env::args().collect();
    if let Err(e) = gradepoint::cli::run(args) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
