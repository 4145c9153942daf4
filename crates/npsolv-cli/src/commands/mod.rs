pub mod batch;
pub mod compute;
pub mod mesh;
