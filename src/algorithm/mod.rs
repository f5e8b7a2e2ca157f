/// Capped greedy nearest-match assignment allowing repeated tiles
pub mod capped;
/// Background worker thread with progress and completion events
pub mod executor;
/// Exact minimum-cost assignment via Kuhn–Munkres
pub mod munkres;
/// Reduction-based approximate one-to-one assignment
pub mod reduction;
/// Duplicate policies, assignments and solver entry points
pub mod solver;
