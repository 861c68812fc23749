//! 시세 데이터 제공자.

pub mod yahoo;
