//! CLI 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 심볼 추세 점검
//! - 메시지 라우팅 시뮬레이션
//! - 정기 알림 수동 실행
//! - LINE 채널 및 설정 점검

pub mod commands;
