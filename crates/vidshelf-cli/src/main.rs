//! Thin entrypoint for the `vidshelf` binary.

use std::process;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let exit_code = vidshelf_cli::run().await;
    process::exit(exit_code);
}
