pub mod generate;
pub mod prepare;
