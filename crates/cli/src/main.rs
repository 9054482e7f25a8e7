//! The main entrypoint for containerized, the Containerfile build-and-run tool.

use anyhow::Result;

fn run() -> Result<()> {
    containerized_utils::initialize_tracing();
    tracing::trace!("starting {}", env!("CARGO_PKG_NAME"));
    containerized_lib::cli::run_from_iter(std::env::args_os())
}

fn main() {
    containerized_utils::run_main(run)
}
