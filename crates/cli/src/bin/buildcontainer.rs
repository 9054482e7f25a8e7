//! Build and run the `build.Containerfile` of a project directory.

use anyhow::Result;

fn run() -> Result<()> {
    containerized_utils::initialize_tracing();
    tracing::trace!("starting buildcontainer");
    containerized_lib::buildcontainer::run_from_iter(std::env::args_os())
}

fn main() {
    containerized_utils::run_main(run)
}
