pub mod console;
pub mod constant;
pub mod instruction;
