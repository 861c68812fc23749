//! 도메인 모델과 외부 협력자 포트.

pub mod journal;
pub mod message;
pub mod price;
pub mod price_provider;
pub mod signal;

pub use journal::*;
pub use message::*;
pub use price::*;
pub use price_provider::*;
pub use signal::*;
