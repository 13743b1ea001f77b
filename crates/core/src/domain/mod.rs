pub mod constraint;
pub mod key;
pub mod table;
