//! Properties that hold for every input buffer.

use quickcheck_macros::quickcheck;
use tern_scanner::{ScanMode, Scanner, ScannerConfig, TokenKind};

const MODES: [ScanMode; 2] = [ScanMode::Css, ScanMode::Sgml];

fn configs() -> [ScannerConfig; 3] {
    [
        ScannerConfig::default(),
        ScannerConfig::default().partial(true),
        ScannerConfig::default().detect_errors(true).count_lines(true),
    ]
}

/// Concatenating every token's source text gives back the buffer.
fn round_trips(source: &[u8]) -> bool {
    MODES.iter().all(|&mode| {
        configs().iter().all(|&config| {
            let mut rebuilt = Vec::with_capacity(source.len());
            let mut expected_start = 0;
            for token in Scanner::with_config(source, mode, config) {
                if token.span.start != expected_start {
                    return false;
                }
                expected_start = token.span.end;
                rebuilt.extend_from_slice(token.text(source));
            }
            rebuilt == source
        })
    })
}

#[quickcheck]
fn prop_round_trip_bytes(source: Vec<u8>) -> bool {
    round_trips(&source)
}

#[quickcheck]
fn prop_round_trip_text(source: String) -> bool {
    round_trips(source.as_bytes())
}

#[quickcheck]
fn prop_round_trip_markup_alphabet(picks: Vec<u8>) -> bool {
    // Bias the input towards bytes that start tokens.
    const ALPHABET: &[u8] = b"<>/!?-=\"' &;#[]{}():*.a1 \n";
    let source: Vec<u8> = picks
        .iter()
        .map(|&p| ALPHABET[usize::from(p) % ALPHABET.len()])
        .collect();
    round_trips(&source)
}

#[quickcheck]
fn prop_token_count_bounded_by_length(source: Vec<u8>) -> bool {
    MODES
        .iter()
        .all(|&mode| Scanner::new(&source, mode).count() <= source.len())
}

#[quickcheck]
fn prop_skip_to_terminates(source: String, target: u8) -> bool {
    let targets = [
        TokenKind::Char(b';'),
        TokenKind::Char(b'}'),
        TokenKind::Char(b')'),
        TokenKind::TagEnd,
        TokenKind::None,
        TokenKind::Char(target),
    ];
    MODES.iter().all(|&mode| {
        targets.iter().all(|&target| {
            let mut scanner = Scanner::new(source.as_bytes(), mode);
            let mut steps = 0;
            while scanner.peek_token().is_some() && steps <= source.len() {
                let _ = scanner.skip_to(target);
                // A stop leaves the blocking token in place; step over it.
                let _ = scanner.next_token();
                steps += 1;
            }
            steps <= source.len()
        })
    })
}
