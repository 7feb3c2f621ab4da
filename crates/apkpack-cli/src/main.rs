//! `apkpack` binary entrypoint.

use std::process;

fn main() {
    process::exit(apkpack_cli::run());
}
