pub mod pool;
pub mod shares;

// Re-export for easier access
pub use pool::LiquidityPool;
pub use shares::UserShareRecord;
