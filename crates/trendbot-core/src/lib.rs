//! # Trendbot Core
//!
//! 추세 알림 봇의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 봇 전반에서 사용되는 기본 타입을 제공합니다:
//! - 가격 시계열 및 이동평균 추세 신호
//! - 수신 메시지와 로그 항목
//! - 외부 협력자 포트 (시세 조회, 로그/에러/스냅샷 저장)
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
