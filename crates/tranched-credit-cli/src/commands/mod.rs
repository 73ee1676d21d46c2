pub mod accountant;
pub mod leverage;
pub mod pool;
