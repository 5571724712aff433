mod cli;
mod config;
mod local_logger;
mod prelude;
mod probe;
mod snapshot;

fn main() {
    let res = crate::cli::run();
    if let Err(err) = res {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
