//! 명령어 파서 속성 테스트.

use proptest::prelude::*;
use trendbot_notification::{is_valid_symbol, Command, CommandParser};

proptest! {
    #[test]
    fn parse_is_total(text in any::<String>()) {
        let parser = CommandParser::default();
        match parser.parse(&text) {
            Command::SymbolQuery { symbol } => prop_assert!(is_valid_symbol(&symbol)),
            Command::Keyword(_) => {}
            Command::Unknown { raw_text } => prop_assert_eq!(raw_text, text),
        }
    }

    #[test]
    fn prefixed_symbol_is_uppercased(
        symbol in "[a-zA-Z0-9][a-zA-Z0-9.-]{0,9}",
        left in " {0,3}",
        right in " {0,3}",
    ) {
        let parser = CommandParser::default();
        let text = format!("{left}查{right}{symbol}{right}");
        prop_assert_eq!(
            parser.parse(&text),
            Command::SymbolQuery { symbol: symbol.to_ascii_uppercase() }
        );
    }

    #[test]
    fn parse_is_deterministic(text in "\\PC{0,40}") {
        let parser = CommandParser::default();
        prop_assert_eq!(parser.parse(&text), parser.parse(&text));
    }
}
