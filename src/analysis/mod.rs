/// Cost matrix construction between cell and tile descriptors
pub mod cost;
/// Fixed-length numeric descriptors of image regions
pub mod descriptor;
