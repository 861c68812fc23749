//! 봇 명령어 파서.
//!
//! 자유 텍스트를 구조화된 명령어로 분류합니다. 순수 함수이며 어떤 입력에도
//! 패닉하지 않고, 해석할 수 없는 입력은 [`Command::Unknown`]이 됩니다.
//!
//! 우선순위:
//! 1. 키워드 별칭 (ASCII 대소문자 무시)
//! 2. 시작 위치의 조회 접두어 + 심볼 (`查SPY`, `查 aapl`)
//! 3. 그 외 전부 `Unknown`

use std::collections::HashMap;

use trendbot_core::CommandConfig;

/// 키워드 명령어의 의도.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    /// 도움말
    Help,
    /// 명령어 목록
    CommandList,
    /// 도우미 호출
    CallAssistant,
}

/// 봇 명령어.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 심볼 종가/이동평균 조회
    SymbolQuery { symbol: String },
    /// 고정 키워드
    Keyword(Intent),
    /// 알 수 없는 입력 (원문 유지)
    Unknown { raw_text: String },
}

impl Command {
    /// 로그용 짧은 이름.
    pub fn kind(&self) -> &'static str {
        match self {
            Command::SymbolQuery { .. } => "symbol_query",
            Command::Keyword(Intent::Help) => "help",
            Command::Keyword(Intent::CommandList) => "command_list",
            Command::Keyword(Intent::CallAssistant) => "call_assistant",
            Command::Unknown { .. } => "unknown",
        }
    }
}

/// 심볼 문자 규칙: 대문자, 숫자, `.`, `-`.
pub fn is_valid_symbol(symbol: &str) -> bool {
    !symbol.is_empty()
        && symbol
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '.' || c == '-')
}

/// 명령어 파서.
#[derive(Debug, Clone)]
pub struct CommandParser {
    /// ASCII 소문자로 정규화된 조회 접두어
    query_prefix: String,
    /// 정규화된 별칭 → 의도
    keywords: HashMap<String, Intent>,
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::from_config(&CommandConfig::default())
    }
}

impl CommandParser {
    /// 키워드 없이 조회 접두어만으로 파서를 생성합니다.
    ///
    /// 접두어가 비어 있으면 심볼 조회를 인식하지 않습니다.
    pub fn new(query_prefix: impl AsRef<str>) -> Self {
        Self {
            query_prefix: normalize(query_prefix.as_ref()),
            keywords: HashMap::new(),
        }
    }

    /// 설정에서 파서를 생성합니다.
    pub fn from_config(config: &CommandConfig) -> Self {
        let aliases = [
            (&config.help_aliases, Intent::Help),
            (&config.command_list_aliases, Intent::CommandList),
            (&config.assistant_aliases, Intent::CallAssistant),
        ];

        aliases
            .into_iter()
            .flat_map(|(list, intent)| list.iter().map(move |alias| (alias, intent)))
            .fold(Self::new(&config.query_prefix), |parser, (alias, intent)| {
                parser.with_keyword(alias, intent)
            })
    }

    /// 키워드 별칭을 추가합니다.
    pub fn with_keyword(mut self, alias: impl AsRef<str>, intent: Intent) -> Self {
        let alias = normalize(alias.as_ref());
        if !alias.is_empty() {
            self.keywords.insert(alias, intent);
        }
        self
    }

    /// 조회 접두어.
    pub fn query_prefix(&self) -> &str {
        &self.query_prefix
    }

    /// 텍스트를 명령어로 분류합니다.
    pub fn parse(&self, raw_text: &str) -> Command {
        let text = raw_text.trim();
        let folded = text.to_ascii_lowercase();

        if let Some(intent) = self.keywords.get(&folded) {
            return Command::Keyword(*intent);
        }

        if !self.query_prefix.is_empty() && folded.starts_with(&self.query_prefix) {
            // ASCII 소문자 변환은 바이트 길이를 바꾸지 않으므로 같은 위치에서 자를 수 있음
            let rest = text.get(self.query_prefix.len()..).unwrap_or("").trim();
            let symbol = rest.to_ascii_uppercase();
            if is_valid_symbol(&symbol) {
                return Command::SymbolQuery { symbol };
            }
        }

        Command::Unknown {
            raw_text: raw_text.to_string(),
        }
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}
