mod error;
mod input;
mod path;
mod config;
mod formatting;
mod cli;

fn main() {
    use tracing_subscriber::{FmtSubscriber, EnvFilter};

    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .expect("failed to initialize global tracing subscriber");

    if let Err(err) = cli::start() {
        println!("{}", err);

        std::process::exit(1);
    }
}
