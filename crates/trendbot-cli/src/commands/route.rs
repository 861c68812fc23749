//! 메시지 라우팅 시뮬레이션.
//!
//! 입력 텍스트를 실제 라우터로 분류하고 응답을 만들지만, 전송과 기록은 하지 않습니다.

use std::fmt::Write as _;

use trendbot_notification::{MessageRouter, RouterOutcome};

/// 텍스트 하나를 라우팅합니다. 응답 토큰이 있는 메시지로 취급합니다.
pub async fn simulate_route(router: &MessageRouter, text: &str) -> RouterOutcome {
    router.route(text, true).await
}

/// 라우팅 결과를 출력 문자열로 만듭니다.
pub fn render_outcome(outcome: &RouterOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "명령어: {}", outcome.command.kind());
    let _ = writeln!(out, "상태: {:?}", outcome.status);

    if outcome.replies.is_empty() {
        out.push_str("(응답 없음)\n");
    }
    for (i, reply) in outcome.replies.iter().enumerate() {
        let _ = writeln!(out, "--- 응답 {} ---", i + 1);
        let _ = writeln!(out, "{}", reply);
    }
    out
}
