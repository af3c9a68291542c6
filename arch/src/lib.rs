pub mod flag;
pub mod inst;
pub mod reg;
