//! # Trendbot Notification
//!
//! 메시지 라우팅과 LINE 메시징.
//!
//! 수신 텍스트는 다음 순서로 처리됩니다:
//! 1. [`CommandParser`]가 심볼 조회 / 키워드 / 알 수 없음으로 분류
//! 2. 심볼 조회면 시세를 가져와 이동평균 신호 계산
//! 3. [`ReplyFormatter`]가 응답 텍스트 생성
//! 4. [`MessageRouter`]가 응답 전송과 로그 기록을 처리
//!
//! # 지원 명령어
//!
//! - `查<심볼>` - 심볼 종가와 200주 이동평균 조회 (예: `查SPY`)
//! - `幫助` / `help` - 도움말
//! - `功能` / `指令` - 명령어 목록
//! - `呼叫寶比` - 도우미 호출 (선택 기능)

pub mod command;
pub mod formatter;
pub mod line;
pub mod notifier;
pub mod random;
pub mod router;
pub mod signature;
pub mod types;

pub use command::*;
pub use formatter::*;
pub use line::*;
pub use notifier::*;
pub use random::*;
pub use router::*;
pub use signature::*;
pub use types::*;
