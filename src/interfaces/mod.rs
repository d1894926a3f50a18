/// Interfaces Layer - External Entry Points
///
/// ## Modules
/// - `cli`: command-line interface and demonstration driver (main.rs logic)

pub mod cli;
