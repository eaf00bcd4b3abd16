//! Line-oriented text protocol between the server and the players.
//!
//! Server to client, once per granted turn:
//!
//! ```text
//! <columns> <rows> <numColors> <numPlayers>
//! <originX+1> <originY+1>
//! <color_1> ... <color_numPlayers>
//! <rows lines of columns colors>
//! ```
//!
//! Client to server: one line holding the chosen color. Everything here is
//! pure; the connection types on either side own the sockets.

use crate::board::{Board, Color};
use crate::error::ProtocolError;
use std::fmt::Write as _;

/// Status line sent to a session once it has been deactivated
pub const INACTIVE_STATUS: &str = "INACTIVE";

/// First line of a state broadcast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub columns: usize,
    pub rows: usize,
    pub num_colors: Color,
    pub num_players: usize,
}

impl Header {
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 4 {
            return Err(ProtocolError::FieldCount {
                line: "header",
                expected: 4,
                found: fields.len(),
            });
        }
        Ok(Self {
            columns: parse_field(fields[0])?,
            rows: parse_field(fields[1])?,
            num_colors: parse_field(fields[2])?,
            num_players: parse_field(fields[3])?,
        })
    }

    /// Number of lines that follow the header in the same broadcast
    pub fn remaining_lines(&self) -> usize {
        self.rows + 2
    }
}

/// A decoded state broadcast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateFrame {
    pub header: Header,
    /// Zero-based origin of the session holding the turn
    pub origin: (usize, usize),
    /// Current color of every session, in session-list order
    pub colors: Vec<Color>,
    pub board: Board,
}

impl StateFrame {
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let mut lines = text.lines();

        let header = Header::parse(lines.next().ok_or(ProtocolError::MissingLine("header"))?)?;

        let origin_line = lines.next().ok_or(ProtocolError::MissingLine("origin"))?;
        let origin = parse_fields::<usize>(origin_line, "origin", Some(2))?;
        if origin[0] == 0 || origin[1] == 0 {
            return Err(ProtocolError::ZeroOrigin);
        }
        let origin = (origin[0] - 1, origin[1] - 1);

        let colors_line = lines.next().ok_or(ProtocolError::MissingLine("colors"))?;
        let colors = parse_fields::<Color>(colors_line, "colors", Some(header.num_players))?;

        let mut rows = Vec::with_capacity(header.rows);
        for _ in 0..header.rows {
            let line = lines.next().ok_or(ProtocolError::MissingLine("grid row"))?;
            rows.push(parse_fields::<Color>(line, "grid row", Some(header.columns))?);
        }

        let trailing = lines.filter(|line| !line.trim().is_empty()).count();
        if trailing > 0 {
            return Err(ProtocolError::TrailingLines(trailing));
        }

        let board = Board::from_rows(header.num_colors, &rows)?;
        // Reports the origin the same way the board reports any bad cell
        board.color_at(origin.0, origin.1)?;

        Ok(Self {
            header,
            origin,
            colors,
            board,
        })
    }

    /// Colors in `[1, numColors]` that no session currently holds
    pub fn unused_colors(&self) -> Vec<Color> {
        (1..=self.header.num_colors)
            .filter(|color| !self.colors.contains(color))
            .collect()
    }
}

/// Serializes the complete broadcast for the session whose origin is `origin`
pub fn encode_state(board: &Board, origin: (usize, usize), colors: &[Color]) -> String {
    let mut text = String::with_capacity(board.cell_count() * 3 + 64);

    // Writing into a String cannot fail
    let _ = writeln!(
        text,
        "{} {} {} {}",
        board.columns(),
        board.rows(),
        board.num_colors(),
        colors.len()
    );
    let _ = writeln!(text, "{} {}", origin.0 + 1, origin.1 + 1);

    let colors_line: Vec<String> = colors.iter().map(|c| c.to_string()).collect();
    let _ = writeln!(text, "{}", colors_line.join(" "));
    let _ = writeln!(text, "{}", board);

    text
}

/// Parses a client's response line into the chosen color
pub fn parse_choice(line: &str) -> Result<Color, ProtocolError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(ProtocolError::Empty);
    }
    trimmed
        .parse::<Color>()
        .map_err(|_| ProtocolError::NotANumber(trimmed.to_string()))
}

fn parse_field<T: std::str::FromStr>(field: &str) -> Result<T, ProtocolError> {
    field
        .parse::<T>()
        .map_err(|_| ProtocolError::NotANumber(field.to_string()))
}

fn parse_fields<T: std::str::FromStr>(
    line: &str,
    name: &'static str,
    expected: Option<usize>,
) -> Result<Vec<T>, ProtocolError> {
    let fields = line
        .split_whitespace()
        .map(parse_field)
        .collect::<Result<Vec<T>, _>>()?;

    match expected {
        Some(expected) if fields.len() != expected => Err(ProtocolError::FieldCount {
            line: name,
            expected,
            found: fields.len(),
        }),
        _ => Ok(fields),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoardError;

    fn sample_board() -> Board {
        Board::from_rows(4, &[vec![1, 2, 3], vec![4, 1, 2]]).unwrap()
    }

    #[test]
    fn test_encode_state_layout() {
        let text = encode_state(&sample_board(), (2, 0), &[3, 1]);
        assert_eq!(text, "3 2 4 2\n3 1\n3 1\n1 2 3\n4 1 2\n");
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let board = sample_board();
        let colors = vec![3, 1, 4];

        let frame = StateFrame::decode(&encode_state(&board, (1, 1), &colors)).unwrap();

        assert_eq!(frame.board, board);
        assert_eq!(frame.colors, colors);
        assert_eq!(frame.origin, (1, 1));
        assert_eq!(
            frame.header,
            Header {
                columns: 3,
                rows: 2,
                num_colors: 4,
                num_players: 3,
            }
        );
    }

    #[test]
    fn test_header_remaining_lines() {
        let header = Header::parse("10 7 5 3").unwrap();
        assert_eq!(header.remaining_lines(), 9);
        assert!(matches!(
            Header::parse("10 7 5"),
            Err(ProtocolError::FieldCount { found: 3, .. })
        ));
    }

    #[test]
    fn test_header_rejects_color_count_beyond_color_range() {
        let too_many = format!("10 7 {} 3", u64::from(Color::MAX) + 1);
        assert_eq!(
            Header::parse(&too_many),
            Err(ProtocolError::NotANumber((u64::from(Color::MAX) + 1).to_string()))
        );

        let max = format!("10 7 {} 3", Color::MAX);
        assert_eq!(Header::parse(&max).unwrap().num_colors, Color::MAX);
    }

    #[test]
    fn test_decode_rejects_malformed_frames() {
        assert!(matches!(
            StateFrame::decode(""),
            Err(ProtocolError::MissingLine("header"))
        ));
        assert!(matches!(
            StateFrame::decode("2 1 3 1\n1 1\n2\n1 x\n"),
            Err(ProtocolError::NotANumber(_))
        ));
        assert!(matches!(
            StateFrame::decode("2 2 3 1\n1 1\n2\n1 2\n"),
            Err(ProtocolError::MissingLine("grid row"))
        ));
        assert!(matches!(
            StateFrame::decode("2 1 3 1\n1 1\n2\n1 2\n3 3\n"),
            Err(ProtocolError::TrailingLines(1))
        ));
        assert!(matches!(
            StateFrame::decode("2 1 3 1\n0 1\n2\n1 2\n"),
            Err(ProtocolError::ZeroOrigin)
        ));
        assert!(matches!(
            StateFrame::decode("2 1 3 1\n3 1\n2\n1 2\n"),
            Err(ProtocolError::Board(BoardError::OutOfRange { .. }))
        ));
        assert!(matches!(
            StateFrame::decode("2 1 3 1\n1 1\n2\n1 9\n"),
            Err(ProtocolError::Board(BoardError::InvalidColor { color: 9, .. }))
        ));
    }

    #[test]
    fn test_unused_colors() {
        let frame = StateFrame::decode(&encode_state(&sample_board(), (0, 0), &[2, 4])).unwrap();
        assert_eq!(frame.unused_colors(), vec![1, 3]);
    }

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice("3\n").unwrap(), 3);
        assert_eq!(parse_choice("  12 \r\n").unwrap(), 12);
        assert_eq!(parse_choice("").unwrap_err(), ProtocolError::Empty);
        assert_eq!(parse_choice("\n").unwrap_err(), ProtocolError::Empty);
        assert_eq!(
            parse_choice("abc").unwrap_err(),
            ProtocolError::NotANumber("abc".to_string())
        );
        assert!(parse_choice("-2").is_err());
        assert!(parse_choice("3 4").is_err());
    }
}
