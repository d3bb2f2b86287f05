//! PGN move extraction: a lightweight regex-based parser.
//!
//! Only the main line is kept. Every extracted move is replayed through the
//! rules adapter, so a list returned from here is always playable.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ChessError;
use crate::rules::{Game, STANDARD_START_FEN};

static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\[(\w+)\s+"([^"]*)"\]"#).expect("header regex"));
static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^}]*\}|;[^\n]*").expect("comment regex"));
static VARIATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^()]*\)").expect("variation regex"));
static MOVE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.+").expect("move number regex"));
static MOVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[KQRBN]?[a-h]?[1-8]?x?[a-h][1-8](?:=[QRBN])?|O-O-O|O-O)[+#]?$")
        .expect("move regex")
});

const RESULTS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

/// Ordered SAN moves of the main line of `pgn`, validated from the standard
/// start position.
pub fn history_from_pgn(pgn: &str) -> Result<Vec<String>, ChessError> {
    if pgn.trim().is_empty() {
        return Err(ChessError::MalformedPgn("empty PGN".to_string()));
    }

    // Lessons always start from the initial position
    if extract_header(pgn, "SetUp").as_deref() == Some("1") {
        if let Some(fen) = extract_header(pgn, "FEN") {
            if fen != STANDARD_START_FEN {
                return Err(ChessError::MalformedPgn(format!(
                    "non-standard start position '{fen}'"
                )));
            }
        }
    }

    let tokens = extract_moves(pgn)?;
    if tokens.is_empty() {
        return Err(ChessError::MalformedPgn("no moves found".to_string()));
    }

    let mut game = Game::new();
    for (ply, token) in tokens.iter().enumerate() {
        game.play_san(token).map_err(|_| {
            ChessError::MalformedPgn(format!("illegal move '{token}' at ply {ply}"))
        })?;
    }

    Ok(game.sans())
}

/// Extract SAN tokens from PGN text (after removing headers, comments,
/// variations, move numbers, results and NAGs). Anything left that is not a
/// move makes the whole text malformed.
fn extract_moves(pgn: &str) -> Result<Vec<String>, ChessError> {
    let no_headers = HEADER_RE.replace_all(pgn, "");
    let no_comments = COMMENT_RE.replace_all(&no_headers, "");

    // Innermost variations first so nested ones disappear too
    let mut text = no_comments.into_owned();
    while VARIATION_RE.is_match(&text) {
        text = VARIATION_RE.replace_all(&text, "").into_owned();
    }

    let mut moves = Vec::new();
    for raw in text.split_whitespace() {
        if RESULTS.contains(&raw) || raw.starts_with('$') {
            continue;
        }
        // "12.Nf3" and "12..." both carry the number glued on
        let token = MOVE_NUMBER_RE.replace(raw, "");
        let token = token.trim_end_matches(['!', '?']);
        if token.is_empty() {
            continue;
        }

        let token = normalize_castling(token);
        if !MOVE_RE.is_match(&token) {
            return Err(ChessError::MalformedPgn(format!("unreadable token '{raw}'")));
        }
        moves.push(token);
    }

    Ok(moves)
}

/// Zero-style castling (`0-0`, `0-0-0`) written the SAN way.
fn normalize_castling(token: &str) -> String {
    if token.starts_with("0-0") {
        token.replace('0', "O")
    } else {
        token.to_string()
    }
}

/// Extract a string value from a PGN header (e.g. Event, ECO).
pub fn extract_header(pgn: &str, header_name: &str) -> Option<String> {
    HEADER_RE
        .captures_iter(pgn)
        .find(|cap| &cap[1] == header_name)
        .map(|cap| cap[2].to_string())
        .filter(|value| !value.is_empty())
}
