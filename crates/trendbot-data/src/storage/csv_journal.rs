//! CSV 파일 기반 로그 저장소.
//!
//! 세 개의 파일을 관리합니다:
//! - 메시지 로그: 수신 메시지마다 한 행 추가
//! - 에러 로그: `[시각] context: message` 한 행 추가
//! - 가격 스냅샷: 최신 신호 한 행 (덮어쓰기)

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;

use trendbot_core::{
    ErrorSink, LogEntry, LogSink, PersistenceError, SnapshotSink, StorageConfig, TrendSignal,
};

use super::format_error_line;

const MESSAGE_HEADERS: [&str; 4] = ["timestamp", "message", "user_info", "entry_id"];
const ERROR_HEADERS: [&str; 2] = ["timestamp", "entry"];
const SNAPSHOT_HEADERS: [&str; 6] = [
    "timestamp",
    "symbol",
    "close",
    "moving_average",
    "window",
    "status",
];

/// CSV 로그 저장소.
#[derive(Debug)]
pub struct CsvJournal {
    message_log: PathBuf,
    error_log: PathBuf,
    snapshot: PathBuf,
    /// 동시 추가 시 행이 섞이지 않도록 직렬화
    write_lock: Mutex<()>,
}

impl CsvJournal {
    /// 디렉토리를 만들고 저장소를 엽니다.
    pub fn open(config: &StorageConfig) -> Result<Self, PersistenceError> {
        let dir = Path::new(&config.dir);
        fs::create_dir_all(dir)?;

        Ok(Self {
            message_log: dir.join(&config.message_log_file),
            error_log: dir.join(&config.error_log_file),
            snapshot: dir.join(&config.snapshot_file),
            write_lock: Mutex::new(()),
        })
    }

    /// 기본 파일 이름으로 주어진 디렉토리에 저장소를 엽니다.
    pub fn in_dir(dir: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        Self::open(&StorageConfig {
            dir: dir.as_ref().to_string_lossy().into_owned(),
            ..Default::default()
        })
    }

    pub fn message_log_path(&self) -> &Path {
        &self.message_log
    }

    pub fn error_log_path(&self) -> &Path {
        &self.error_log
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot
    }

    async fn append_row(
        &self,
        path: &Path,
        headers: &'static [&'static str],
        record: Vec<String>,
    ) -> Result<(), PersistenceError> {
        let _guard = self.write_lock.lock().await;
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || append_record(&path, headers, &record))
            .await
            .map_err(|e| PersistenceError::Write(e.to_string()))?
    }
}

fn append_record(path: &Path, headers: &[&str], record: &[String]) -> Result<(), PersistenceError> {
    let needs_header = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    if needs_header {
        writer.write_record(headers).map_err(csv_error)?;
    }
    writer.write_record(record).map_err(csv_error)?;
    writer.flush()?;
    Ok(())
}

fn overwrite_record(
    path: &Path,
    headers: &[&str],
    record: &[String],
) -> Result<(), PersistenceError> {
    let mut writer = csv::Writer::from_path(path).map_err(csv_error)?;
    writer.write_record(headers).map_err(csv_error)?;
    writer.write_record(record).map_err(csv_error)?;
    writer.flush()?;
    Ok(())
}

fn csv_error(err: csv::Error) -> PersistenceError {
    PersistenceError::Write(err.to_string())
}

#[async_trait]
impl LogSink for CsvJournal {
    async fn append(&self, entry: &LogEntry) -> Result<(), PersistenceError> {
        let record = vec![
            entry.recorded_at.to_rfc3339(),
            entry.text.clone(),
            entry.user_info(),
            entry.id.to_string(),
        ];
        self.append_row(&self.message_log, &MESSAGE_HEADERS, record)
            .await?;
        debug!(entry_id = %entry.id, "Message logged");
        Ok(())
    }
}

#[async_trait]
impl ErrorSink for CsvJournal {
    async fn append(&self, message: &str, context: &str) -> Result<(), PersistenceError> {
        let now = Utc::now();
        let record = vec![now.to_rfc3339(), format_error_line(now, context, message)];
        self.append_row(&self.error_log, &ERROR_HEADERS, record).await
    }
}

#[async_trait]
impl SnapshotSink for CsvJournal {
    async fn record(&self, signal: &TrendSignal) -> Result<(), PersistenceError> {
        let record = vec![
            signal.computed_at.to_rfc3339(),
            signal.symbol.clone(),
            format!("{:.2}", signal.last_close),
            format!("{:.2}", signal.moving_average),
            signal.window.to_string(),
            signal.status().as_str().to_string(),
        ];

        let _guard = self.write_lock.lock().await;
        let path = self.snapshot.clone();
        tokio::task::spawn_blocking(move || overwrite_record(&path, &SNAPSHOT_HEADERS, &record))
            .await
            .map_err(|e| PersistenceError::Write(e.to_string()))?
    }
}
