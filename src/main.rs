// This binary crate is intentionally minimal.
// All classifier logic lives in the library (src/lib.rs and its modules).
// Run the demos with:
//   cargo run --example xor
//   cargo run --example tabular
fn main() {
    ferrite_classify::telemetry::init_tracing();
    tracing::info!("ferrite-classify: from-scratch neural network and Naive Bayes classifiers.");
    tracing::info!("Run `cargo run --example tabular` to compare a dropout net with Gaussian Naive Bayes.");
}
