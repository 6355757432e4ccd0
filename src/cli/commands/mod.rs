pub mod seed;
pub mod serve;
