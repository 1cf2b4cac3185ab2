pub mod airports;
pub mod metars;
