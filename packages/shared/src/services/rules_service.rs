use std::str::FromStr;

use chess::{BitBoard, Board, BoardStatus, ChessMove, Color, File, Game as Replay, MoveGen, Piece};

use crate::models::game::INITIAL_FEN;
use crate::services::errors::rules_service_errors::RulesServiceError;

/// Boundary over the `chess` crate. Everything the rest of the system knows
/// about chess goes through here: positions are opaque FEN strings, moves
/// are SAN (with a coordinate-notation fallback on input).
#[derive(Clone, Default)]
pub struct RulesService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::White => "white",
            Side::Black => "black",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionStatus {
    Ongoing,
    Stalemate,
    Checkmate,
}

/// Result of a successfully applied move.
#[derive(Debug, Clone)]
pub struct AppliedMove {
    pub san: String,
    pub fen_after: String,
    pub status: PositionStatus,
}

const LIGHT_SQUARES: BitBoard = BitBoard(0x55AA_55AA_55AA_55AA);

impl RulesService {
    pub fn new() -> Self {
        RulesService
    }

    pub fn initial_fen(&self) -> &'static str {
        INITIAL_FEN
    }

    pub fn side_to_move(&self, fen: &str) -> Result<Side, RulesServiceError> {
        let board = parse_board(fen)?;
        Ok(match board.side_to_move() {
            Color::White => Side::White,
            Color::Black => Side::Black,
        })
    }

    /// Legal moves in coordinate notation, for client-side hints.
    pub fn legal_moves(&self, fen: &str) -> Result<Vec<String>, RulesServiceError> {
        let board = parse_board(fen)?;
        Ok(MoveGen::new_legal(&board)
            .map(|m| match m.get_promotion() {
                Some(p) => format!(
                    "{}{}{}",
                    m.get_source(),
                    m.get_dest(),
                    piece_letter(p).to_ascii_lowercase()
                ),
                None => format!("{}{}", m.get_source(), m.get_dest()),
            })
            .collect())
    }

    /// Parses and applies one move. SAN is tried first, then coordinate
    /// notation; the canonical SAN of whatever matched is returned.
    pub fn apply_move(&self, fen: &str, input: &str) -> Result<AppliedMove, RulesServiceError> {
        let board = parse_board(fen)?;
        let mv = parse_move(&board, input)?;
        let san = render_san(&board, mv);
        let after = board.make_move_new(mv);
        let status = match after.status() {
            BoardStatus::Ongoing => PositionStatus::Ongoing,
            BoardStatus::Stalemate => PositionStatus::Stalemate,
            BoardStatus::Checkmate => PositionStatus::Checkmate,
        };
        Ok(AppliedMove {
            san,
            fen_after: format!("{}", after),
            status,
        })
    }

    /// True when neither side retains mating material: bare kings, a single
    /// minor piece, or same-colored bishops only.
    pub fn is_insufficient_material(&self, fen: &str) -> Result<bool, RulesServiceError> {
        let board = parse_board(fen)?;
        match board.combined().popcnt() {
            2 => Ok(true),
            3 => {
                let minors =
                    (*board.pieces(Piece::Bishop) | *board.pieces(Piece::Knight)).popcnt();
                Ok(minors == 1)
            }
            4 => {
                let bishops = *board.pieces(Piece::Bishop);
                if bishops.popcnt() != 2 {
                    return Ok(false);
                }
                let white_bishops = bishops & *board.color_combined(Color::White);
                if white_bishops.popcnt() != 1 {
                    return Ok(false);
                }
                let on_light = (bishops & LIGHT_SQUARES).popcnt();
                Ok(on_light == 0 || on_light == 2)
            }
            _ => Ok(false),
        }
    }

    /// Whether the side to move could claim a draw (threefold repetition or
    /// the fifty-move rule). Needs the full transcript because the position
    /// string alone carries no history.
    pub fn can_claim_draw(&self, transcript: &str) -> Result<bool, RulesServiceError> {
        if transcript.is_empty() {
            return Ok(false);
        }
        let mut replay = Replay::new();
        for san in transcript.split_whitespace() {
            let position = replay.current_position();
            let mv = parse_move(&position, san)?;
            if !replay.make_move(mv) {
                return Err(RulesServiceError::InvalidPosition(format!(
                    "transcript replay rejected move {:?}",
                    san
                )));
            }
        }
        Ok(replay.can_declare_draw())
    }

    /// Replays a SAN transcript from the initial position and returns the
    /// resulting FEN.
    pub fn replay_transcript(&self, transcript: &str) -> Result<String, RulesServiceError> {
        let mut board = parse_board(INITIAL_FEN)?;
        for san in transcript.split_whitespace() {
            let mv = parse_move(&board, san)?;
            board = board.make_move_new(mv);
        }
        Ok(format!("{}", board))
    }
}

fn parse_board(fen: &str) -> Result<Board, RulesServiceError> {
    Board::from_str(fen)
        .map_err(|e| RulesServiceError::InvalidPosition(format!("invalid FEN {:?}: {}", fen, e)))
}

fn parse_move(board: &Board, input: &str) -> Result<ChessMove, RulesServiceError> {
    let normalized = input.trim().trim_end_matches(['+', '#', '!', '?']);
    let normalized = match normalized {
        "0-0" => "O-O",
        "0-0-0" => "O-O-O",
        other => other,
    };

    // SAN match: compare against the rendered SAN of every legal move, so
    // parser and renderer can never disagree.
    for mv in MoveGen::new_legal(board) {
        if san_body(board, mv) == normalized {
            return Ok(mv);
        }
    }

    // Coordinate fallback, e.g. "e2e4" or "a7a8q".
    let mv = ChessMove::from_str(normalized)
        .map_err(|_| RulesServiceError::InvalidMoveSyntax(input.to_string()))?;
    if MoveGen::new_legal(board).any(|m| m == mv) {
        Ok(mv)
    } else {
        Err(RulesServiceError::IllegalMove(input.to_string()))
    }
}

/// Canonical SAN including the check/checkmate suffix.
fn render_san(board: &Board, mv: ChessMove) -> String {
    let body = san_body(board, mv);
    let after = board.make_move_new(mv);
    let suffix = match after.status() {
        BoardStatus::Checkmate => "#",
        _ if after.checkers().popcnt() > 0 => "+",
        _ => "",
    };
    format!("{}{}", body, suffix)
}

fn san_body(board: &Board, mv: ChessMove) -> String {
    let source = mv.get_source();
    let dest = mv.get_dest();
    let piece = board.piece_on(source).unwrap_or(Piece::Pawn);

    if piece == Piece::King {
        let from_file = source.get_file().to_index() as i32;
        let to_file = dest.get_file().to_index() as i32;
        if to_file - from_file == 2 {
            return "O-O".to_string();
        }
        if from_file - to_file == 2 {
            return "O-O-O".to_string();
        }
    }

    // En passant shows up as a diagonal pawn move onto an empty square.
    let is_capture = board.piece_on(dest).is_some()
        || (piece == Piece::Pawn && source.get_file() != dest.get_file());

    let mut san = String::new();
    if piece == Piece::Pawn {
        if is_capture {
            san.push(file_char(source.get_file()));
        }
    } else {
        san.push(piece_letter(piece));
        san.push_str(&disambiguation(board, mv, piece));
    }
    if is_capture {
        san.push('x');
    }
    san.push_str(&dest.to_string());
    if let Some(promotion) = mv.get_promotion() {
        san.push('=');
        san.push(piece_letter(promotion));
    }
    san
}

/// SAN disambiguation when another piece of the same kind can reach the same
/// destination: file first, then rank, then the full square.
fn disambiguation(board: &Board, mv: ChessMove, piece: Piece) -> String {
    let alternatives: Vec<ChessMove> = MoveGen::new_legal(board)
        .filter(|m| {
            m.get_dest() == mv.get_dest()
                && m.get_source() != mv.get_source()
                && board.piece_on(m.get_source()) == Some(piece)
        })
        .collect();

    if alternatives.is_empty() {
        return String::new();
    }

    let source = mv.get_source();
    let shares_file = alternatives
        .iter()
        .any(|m| m.get_source().get_file() == source.get_file());
    let shares_rank = alternatives
        .iter()
        .any(|m| m.get_source().get_rank() == source.get_rank());

    if !shares_file {
        file_char(source.get_file()).to_string()
    } else if !shares_rank {
        (source.get_rank().to_index() + 1).to_string()
    } else {
        source.to_string()
    }
}

fn piece_letter(piece: Piece) -> char {
    match piece {
        Piece::Pawn => 'P',
        Piece::Knight => 'N',
        Piece::Bishop => 'B',
        Piece::Rook => 'R',
        Piece::Queen => 'Q',
        Piece::King => 'K',
    }
}

fn file_char(file: File) -> char {
    (b'a' + file.to_index() as u8) as char
}
