//! # Voxel Client Entry Point
//!
//! Calls into the library's `run()` and turns a startup failure into a non-zero exit.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release
//! ```

fn main() {
    if let Err(err) = voxel_client::run() {
        log::error!("{}", err);
        std::process::exit(1);
    }
}
