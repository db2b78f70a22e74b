use clap::Parser;
use git_migrator::{git_migrator_main, GitMigratorCli};
use std::process::exit;

#[tokio::main]
async fn main() {
    println!(concat!(
        env!("CARGO_PKG_NAME"),
        " ",
        env!("CARGO_PKG_VERSION")
    ));
    dotenv::dotenv().ok();
    let args = GitMigratorCli::parse();
    let level = match args.verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::builder()
        .filter_level(level)
        .parse_default_env()
        .format_target(false)
        .format_timestamp(None)
        .init();
    match git_migrator_main(args).await {
        Ok(_) => {
            exit(0);
        }
        Err(e) => {
            eprintln!("{e}");
            exit(1);
        }
    };
}
