//! 시세 데이터 및 표 형식 로그 저장.
//!
//! 이 crate는 다음을 제공합니다:
//! - Yahoo Finance chart API 기반 종가 시계열 조회
//! - CSV 파일 기반 메시지/에러 로그와 가격 스냅샷 저장소
//! - 테스트와 드라이런용 메모리 저장소

pub mod provider;
pub mod storage;

pub use provider::yahoo::{YahooChartClient, YahooChartConfig};
pub use storage::csv_journal::CsvJournal;
pub use storage::memory::MemoryJournal;
pub use storage::format_error_line;
