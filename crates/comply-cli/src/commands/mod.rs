pub mod article;
pub mod audit;
pub mod dispatch;
pub mod migrate;
pub mod obligation;
pub mod org;
pub mod regulation;
pub mod shared;
pub mod system;
