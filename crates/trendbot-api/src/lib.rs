//! LINE 웹훅 서버와 정기 추세 알림.
//!
//! # 모듈 구성
//!
//! - [`bootstrap`]: 설정에서 서비스 그래프 조립
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: 웹훅과 헬스 체크 엔드포인트
//! - [`tasks`]: 백그라운드 작업 (정기 알림 스케줄러)
//! - [`error`]: API 에러 응답

pub mod bootstrap;
pub mod error;
pub mod routes;
pub mod state;
pub mod tasks;

pub use bootstrap::Services;
pub use error::ApiErrorResponse;
pub use routes::*;
pub use state::{AppState, ProfileLookup};
pub use tasks::{run_scheduler, Schedule, ScheduleError, Trigger};
