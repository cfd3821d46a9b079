//! Line-oriented request protocol
//!
//! Input is a whitespace-separated token stream of requests:
//!
//! ```text
//! SOLVE_GAME_STATE <height> <width> <minToWin> <playerNumber>
//! <height x width cells, row-major: 0 empty, 1 first player, 2 second player>
//! ```
//!
//! Each valid request produces exactly one verdict line. An unknown command
//! token produces `Invalid command: <token>` even when the rest of its
//! request is malformed; a malformed solve request produces
//! `Invalid request: <reason>` and the reader skips ahead to the next
//! `SOLVE_GAME_STATE` token.
//!
//! # Example
//!
//! ```
//! use nmk::protocol::run_session;
//! use nmk::Solver;
//!
//! let input = "SOLVE_GAME_STATE 3 3 3 1\n1 2 0\n1 0 0\n0 0 0\n";
//! let mut output = Vec::new();
//! run_session(input.as_bytes(), &mut output, &Solver::new()).unwrap();
//! assert_eq!(String::from_utf8(output).unwrap(), "FIRST_PLAYER_WINS\n");
//! ```

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use log::{debug, warn};

use crate::board::{Board, Mark};
use crate::engine::Solver;
use crate::error::{Error, Result};

/// Command token asking to solve the following grid
pub const SOLVE_COMMAND: &str = "SOLVE_GAME_STATE";

/// Whitespace tokenizer over a buffered reader
pub struct TokenReader<R> {
    reader: R,
    pending: VecDeque<String>,
}

impl<R: BufRead> TokenReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: VecDeque::new(),
        }
    }

    /// Read lines until a token is buffered. Returns false at end of input.
    fn fill(&mut self) -> io::Result<bool> {
        let mut line = String::new();
        while self.pending.is_empty() {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(false);
            }
            self.pending
                .extend(line.split_whitespace().map(str::to_owned));
        }
        Ok(true)
    }

    pub fn next_token(&mut self) -> io::Result<Option<String>> {
        if !self.fill()? {
            return Ok(None);
        }
        Ok(self.pending.pop_front())
    }

    pub fn peek(&mut self) -> io::Result<Option<&str>> {
        if !self.fill()? {
            return Ok(None);
        }
        Ok(self.pending.front().map(String::as_str))
    }

    /// Return a token to the front of the stream
    fn push_back(&mut self, token: String) {
        self.pending.push_front(token);
    }

    /// Discard tokens up to (not including) the next `token`
    pub fn skip_until(&mut self, token: &str) -> io::Result<()> {
        loop {
            let skip = matches!(self.peek()?, Some(t) if t != token);
            if !skip {
                return Ok(());
            }
            self.pending.pop_front();
        }
    }

    fn expect(&mut self, expected: &'static str) -> Result<String> {
        self.next_token()?
            .ok_or(Error::UnexpectedEof { expected })
    }

    fn expect_number<T: FromStr>(&mut self, field: &'static str) -> Result<T> {
        let token = self.expect(field)?;
        match token.parse() {
            Ok(value) => Ok(value),
            Err(_) => {
                let err = Error::InvalidInteger {
                    field,
                    token: token.clone(),
                };
                // A truncated request must not swallow the next command
                if token == SOLVE_COMMAND {
                    self.push_back(token);
                }
                Err(err)
            }
        }
    }
}

/// Request command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Solve,
    Unknown(String),
}

impl Command {
    pub fn parse(token: String) -> Command {
        if token == SOLVE_COMMAND {
            Command::Solve
        } else {
            Command::Unknown(token)
        }
    }
}

/// A fully read and validated request
#[derive(Debug, Clone)]
pub struct Request {
    pub min_to_win: usize,
    pub player: Mark,
    pub board: Board,
}

/// Read the next command token. Returns `Ok(None)` at end of input.
pub fn read_command<R: BufRead>(tokens: &mut TokenReader<R>) -> io::Result<Option<Command>> {
    Ok(tokens.next_token()?.map(Command::parse))
}

/// Read the parameters and cells that follow a command token
pub fn read_request<R: BufRead>(tokens: &mut TokenReader<R>) -> Result<Request> {
    let height: usize = tokens.expect_number("height")?;
    let width: usize = tokens.expect_number("width")?;
    let min_to_win: usize = tokens.expect_number("minToWin")?;
    let player_number: u32 = tokens.expect_number("playerNumber")?;

    let total = width
        .checked_mul(height)
        .ok_or(Error::InvalidDimensions { width, height })?;
    let mut cells = Vec::with_capacity(total.min(1 << 16));
    for index in 0..total {
        let token = tokens.expect("cell")?;
        let mark = token.parse().ok().and_then(Mark::from_code);
        match mark {
            Some(mark) => cells.push(mark),
            None => {
                if token == SOLVE_COMMAND {
                    tokens.push_back(token.clone());
                }
                return Err(Error::InvalidCell { token, index });
            }
        }
    }

    let board = Board::from_cells(width, height, cells)?;
    if min_to_win == 0 {
        return Err(Error::InvalidMinToWin(min_to_win));
    }
    let player = Mark::from_player_number(player_number).ok_or(Error::InvalidPlayer(player_number))?;

    Ok(Request {
        min_to_win,
        player,
        board,
    })
}

/// Counters for one session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub solved: usize,
    pub invalid_commands: usize,
    pub rejected: usize,
}

/// Answer every request in `input`, writing one line per request.
///
/// An unknown command is reported as such whether or not its request
/// parses. Malformed requests are reported and skipped; I/O errors end the
/// session.
pub fn run_session<R: BufRead, W: Write>(
    input: R,
    output: &mut W,
    solver: &Solver,
) -> Result<SessionStats> {
    let mut tokens = TokenReader::new(input);
    let mut stats = SessionStats::default();

    while let Some(command) = read_command(&mut tokens)? {
        let request = read_request(&mut tokens);

        let err = match (command, request) {
            (Command::Solve, Ok(mut request)) => {
                let result = solver.solve(&mut request.board, request.min_to_win, request.player);
                writeln!(output, "{}", result.verdict)?;
                stats.solved += 1;
                continue;
            }
            (Command::Unknown(token), request) => {
                writeln!(output, "Invalid command: {}", token)?;
                stats.invalid_commands += 1;
                match request {
                    Ok(_) => continue,
                    Err(err) => {
                        debug!("discarding request of unknown command {}: {}", token, err);
                        err
                    }
                }
            }
            (Command::Solve, Err(err)) => {
                if !matches!(err, Error::Io(_)) {
                    warn!("rejecting request: {}", err);
                    writeln!(output, "Invalid request: {}", err)?;
                    stats.rejected += 1;
                }
                err
            }
        };

        if let Error::Io(_) = err {
            return Err(err);
        }
        if !err.is_recoverable() {
            break;
        }
        tokens.skip_until(SOLVE_COMMAND)?;
    }

    output.flush()?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Pos;

    fn session(input: &str) -> (String, SessionStats) {
        let mut output = Vec::new();
        let stats = run_session(input.as_bytes(), &mut output, &Solver::new()).unwrap();
        (String::from_utf8(output).unwrap(), stats)
    }

    #[test]
    fn test_token_reader_spans_lines() {
        let mut tokens = TokenReader::new("a  b\n\n  c\n".as_bytes());
        assert_eq!(tokens.next_token().unwrap().as_deref(), Some("a"));
        assert_eq!(tokens.peek().unwrap(), Some("b"));
        assert_eq!(tokens.next_token().unwrap().as_deref(), Some("b"));
        assert_eq!(tokens.next_token().unwrap().as_deref(), Some("c"));
        assert_eq!(tokens.next_token().unwrap(), None);
    }

    #[test]
    fn test_read_request() {
        let input = "SOLVE_GAME_STATE 2 3 3 2\n0 1 2\n2 0 0\n";
        let mut tokens = TokenReader::new(input.as_bytes());
        assert_eq!(read_command(&mut tokens).unwrap(), Some(Command::Solve));
        let request = read_request(&mut tokens).unwrap();
        assert_eq!(request.min_to_win, 3);
        assert_eq!(request.player, Mark::Second);
        assert_eq!(request.board.width(), 3);
        assert_eq!(request.board.height(), 2);
        assert_eq!(request.board.get(Pos::new(1, 0)), Mark::First);
        assert_eq!(request.board.get(Pos::new(2, 0)), Mark::Second);
        assert_eq!(request.board.get(Pos::new(0, 1)), Mark::Second);
        assert_eq!(request.board.empty_count(), 3);
        assert_eq!(read_command(&mut tokens).unwrap(), None);
    }

    #[test]
    fn test_solves_each_request() {
        let input = "SOLVE_GAME_STATE 3 3 3 1\n1 2 0\n1 0 0\n0 0 0\n\
                     SOLVE_GAME_STATE 3 3 3 1\n0 0 0\n0 0 0\n0 0 0\n";
        let (output, stats) = session(input);
        assert_eq!(output, "FIRST_PLAYER_WINS\nBOTH_PLAYERS_TIE\n");
        assert_eq!(stats.solved, 2);
    }

    #[test]
    fn test_existing_line_for_second_player() {
        let input = "SOLVE_GAME_STATE 2 2 2 1\n2 0\n2 1\n";
        let (output, _) = session(input);
        assert_eq!(output, "SECOND_PLAYER_WINS\n");
    }

    #[test]
    fn test_invalid_command() {
        let input = "PLAY 1 1 1 1\n0\nSOLVE_GAME_STATE 1 1 1 2\n0\n";
        let (output, stats) = session(input);
        assert_eq!(output, "Invalid command: PLAY\nSECOND_PLAYER_WINS\n");
        assert_eq!(stats.invalid_commands, 1);
        assert_eq!(stats.solved, 1);
    }

    #[test]
    fn test_unknown_command_with_invalid_player() {
        let (output, stats) = session("PLAY 1 1 1 3\n0\n");
        assert_eq!(output, "Invalid command: PLAY\n");
        assert_eq!(stats.invalid_commands, 1);
        assert_eq!(stats.rejected, 0);
    }

    #[test]
    fn test_unknown_command_with_zero_dimensions() {
        let (output, stats) = session("PLAY 0 0 0 0\n");
        assert_eq!(output, "Invalid command: PLAY\n");
        assert_eq!(stats.invalid_commands, 1);
    }

    #[test_log::test]
    fn test_bare_unknown_token_keeps_next_request() {
        let (output, stats) = session("FOO\nSOLVE_GAME_STATE 1 1 1 1\n0\n");
        assert_eq!(output, "Invalid command: FOO\nFIRST_PLAYER_WINS\n");
        assert_eq!(stats.invalid_commands, 1);
        assert_eq!(stats.solved, 1);
    }

    #[test_log::test]
    fn test_malformed_integer_resyncs() {
        let input = "SOLVE_GAME_STATE 3 x 3 1\n0 0 0\nSOLVE_GAME_STATE 1 1 1 1\n0\n";
        let (output, stats) = session(input);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Invalid request: invalid width 'x' (expected a non-negative integer)",
                "FIRST_PLAYER_WINS",
            ]
        );
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.solved, 1);
    }

    #[test]
    fn test_truncated_request_keeps_next_command() {
        let input = "SOLVE_GAME_STATE 2 2\nSOLVE_GAME_STATE 1 1 1 1\n0\n";
        let (output, stats) = session(input);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Invalid request: invalid minToWin"));
        assert_eq!(lines[1], "FIRST_PLAYER_WINS");
        assert_eq!(stats.rejected, 1);
    }

    #[test]
    fn test_invalid_player_skips_request() {
        let input = "SOLVE_GAME_STATE 1 2 2 3\n0 0\nSOLVE_GAME_STATE 1 2 2 1\n0 0\n";
        let (output, _) = session(input);
        assert_eq!(
            output,
            "Invalid request: invalid player number 3 (expected 1 or 2)\nBOTH_PLAYERS_TIE\n"
        );
    }

    #[test]
    fn test_invalid_cell_and_dimensions() {
        let (output, stats) = session("SOLVE_GAME_STATE 1 2 2 1\n0 7\nSOLVE_GAME_STATE 0 3 2 1\n");
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Invalid request: invalid cell '7' at index 1 (expected 0, 1 or 2)",
                "Invalid request: invalid board dimensions 3x0 (both must be positive)",
            ]
        );
        assert_eq!(stats.rejected, 2);
    }

    #[test]
    fn test_end_of_input_inside_request() {
        let (output, stats) = session("SOLVE_GAME_STATE 2 2 2 1\n0 0 0\n");
        assert_eq!(output, "Invalid request: unexpected end of input while reading cell\n");
        assert_eq!(stats.rejected, 1);
    }

    #[test]
    fn test_empty_input() {
        let (output, stats) = session("");
        assert!(output.is_empty());
        assert_eq!(stats, SessionStats::default());
    }
}
