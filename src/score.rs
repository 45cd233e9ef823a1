use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;
use crate::util::Color;

/// A position evaluation in milli-pawns, stored as a signed 32-bit count.
///
/// The band `|v| >= 2^20` encodes "mate in N half-moves": a mate score is
/// `2^20 * (1024 - N)`, so nearer mates rank higher and every mate outranks
/// every pawn score.  Pawn arithmetic saturates at `+-2^30` instead of
/// wrapping into the mate band.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score(i32);

pub const PAWN_VALUE: i32 = 1000;

const MAX_SCORE: i32 = 1 << 30;
const MIN_SCORE: i32 = -MAX_SCORE;

const MATE_SCORE_PER_MOVE: i32 = 1 << 20;
const MAX_MATE_MOVES: i32 = 1 << 10;

#[inline]
const fn clamp_score(v: i64) -> i32 {
    if v > MAX_SCORE as i64 {
        MAX_SCORE
    } else if v < MIN_SCORE as i64 {
        MIN_SCORE
    } else {
        v as i32
    }
}

impl Score {
    #[inline]
    pub const fn zero() -> Score {
        Score(0)
    }

    #[inline]
    pub const fn one_pawn() -> Score {
        Score(PAWN_VALUE)
    }

    #[inline]
    pub const fn max() -> Score {
        Score(MAX_SCORE)
    }

    #[inline]
    pub const fn min() -> Score {
        Score(MIN_SCORE)
    }

    pub fn of_pawns(pawns: f64) -> Score {
        if pawns.is_infinite() {
            let ret = Score::of_moves_to_mate(0);
            return if pawns < 0.0 { -ret } else { ret };
        }
        return Score((pawns * PAWN_VALUE as f64) as i32);
    }

    pub fn of_centi_pawns(centi_pawns: f64) -> Score {
        return Score::of_pawns(centi_pawns / 100.0);
    }

    #[inline]
    pub const fn of_milli_pawns(milli_pawns: i32) -> Score {
        Score(milli_pawns)
    }

    #[inline]
    pub const fn to_milli_pawns(self) -> i32 {
        self.0
    }

    #[inline]
    pub fn to_centi_pawns(self) -> i32 {
        ((self.0 as i64) * 100 / PAWN_VALUE as i64) as i32
    }

    pub fn to_pawns(self) -> f64 {
        return self.0 as f64 / PAWN_VALUE as f64;
    }

    #[inline]
    pub const fn of_moves_to_mate(moves: i32) -> Score {
        Score(MATE_SCORE_PER_MOVE * (MAX_MATE_MOVES - moves))
    }

    /// Half-moves until mate.  Only meaningful when `is_mate()`.
    pub fn moves_to_mate(self) -> i32 {
        debug_assert!(self.is_mate());
        return MAX_MATE_MOVES - (self.0.abs() / MATE_SCORE_PER_MOVE);
    }

    #[inline]
    pub const fn is_mate(self) -> bool {
        self.0 <= -MATE_SCORE_PER_MOVE || self.0 >= MATE_SCORE_PER_MOVE
    }

    #[inline]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn abs(self) -> Score {
        Score(self.0.abs())
    }

    #[inline]
    pub const fn neg(self) -> Score {
        Score(-self.0)
    }

    #[inline]
    pub const fn neg_if(self, v: bool) -> Score {
        if v {
            self.neg()
        } else {
            self
        }
    }

    #[inline]
    pub fn flip_for_color(self, color: Color) -> Score {
        return self.neg_if(color == Color::Black);
    }

    #[inline]
    pub const fn next(self) -> Score {
        Score(self.0 + 1)
    }

    #[inline]
    pub const fn prev(self) -> Score {
        Score(self.0 - 1)
    }

    /// Move a mate score `moves` half-moves further from mate (toward zero).
    /// Identity on non-mate scores.
    pub const fn inc_mate_moves(self, moves: i32) -> Score {
        if !self.is_mate() {
            return self;
        }
        let d = MATE_SCORE_PER_MOVE * moves;
        if self.is_positive() {
            return Score(self.0 - d);
        }
        return Score(self.0 + d);
    }

    /// Move a mate score `moves` half-moves closer to mate.  Identity on
    /// non-mate scores.
    pub const fn dec_mate_moves(self, moves: i32) -> Score {
        if !self.is_mate() {
            return self;
        }
        let d = MATE_SCORE_PER_MOVE * moves;
        if self.is_positive() {
            return Score(self.0 + d);
        }
        return Score(self.0 - d);
    }
}

impl std::ops::Add for Score {
    type Output = Score;
    fn add(self, other: Score) -> Score {
        return Score(clamp_score(self.0 as i64 + other.0 as i64));
    }
}

impl std::ops::AddAssign for Score {
    fn add_assign(&mut self, other: Score) {
        *self = *self + other;
    }
}

impl std::ops::Sub for Score {
    type Output = Score;
    fn sub(self, other: Score) -> Score {
        return Score(clamp_score(self.0 as i64 - other.0 as i64));
    }
}

impl std::ops::SubAssign for Score {
    fn sub_assign(&mut self, other: Score) {
        *self = *self - other;
    }
}

impl std::ops::Neg for Score {
    type Output = Score;
    fn neg(self) -> Score {
        return Score(-self.0);
    }
}

impl std::ops::Mul<i32> for Score {
    type Output = Score;
    fn mul(self, m: i32) -> Score {
        return Score(clamp_score(self.0 as i64 * m as i64));
    }
}

impl std::ops::Mul<f64> for Score {
    type Output = Score;
    fn mul(self, m: f64) -> Score {
        return Score(clamp_score((self.0 as f64 * m) as i64));
    }
}

impl std::ops::Div<i32> for Score {
    type Output = Score;
    fn div(self, m: i32) -> Score {
        return Score(self.0 / m);
    }
}

// Scores multiply and divide as rationals over one pawn, so a multiplier
// expressed in pawns scales another score without changing its unit.
impl std::ops::Mul<Score> for Score {
    type Output = Score;
    fn mul(self, m: Score) -> Score {
        return Score(clamp_score(self.0 as i64 * m.0 as i64 / PAWN_VALUE as i64));
    }
}

impl std::ops::Div<Score> for Score {
    type Output = Score;
    fn div(self, m: Score) -> Score {
        return Score(clamp_score(self.0 as i64 * PAWN_VALUE as i64 / m.0 as i64));
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_mate() {
            let sign = if self.is_negative() { "-" } else { "+" };
            return write!(f, "{}M {}", sign, self.moves_to_mate());
        }
        let sign = if self.0 < 0 { "-" } else { "+" };
        let milli = self.0.abs();
        return write!(f, "{}{}.{:03}", sign, milli / PAWN_VALUE, milli % PAWN_VALUE);
    }
}

impl fmt::Debug for Score {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Score({})", self)
    }
}

impl FromStr for Score {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Score, EngineError> {
        let bad = || EngineError::InvalidMove(format!("bad score '{}'", s));
        let (negative, rest) = match s.bytes().next() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            Some(_) => (false, s),
            None => return Err(bad()),
        };
        if let Some(moves) = rest.strip_prefix("M ") {
            let moves = moves.parse::<i32>().map_err(|_| bad())?;
            if moves < 0 || moves >= MAX_MATE_MOVES {
                return Err(bad());
            }
            return Ok(Score::of_moves_to_mate(moves).neg_if(negative));
        }
        let mut parts = rest.splitn(2, '.');
        let whole = parts.next().ok_or_else(bad)?;
        let whole = whole.parse::<i64>().map_err(|_| bad())?;
        let mut frac: i64 = 0;
        if let Some(frac_str) = parts.next() {
            if frac_str.is_empty() || frac_str.len() > 3 {
                return Err(bad());
            }
            frac = frac_str.parse::<i64>().map_err(|_| bad())?;
            for _ in frac_str.len()..3 {
                frac *= 10;
            }
        }
        let milli = clamp_score(whole * PAWN_VALUE as i64 + frac);
        return Ok(Score(milli).neg_if(negative));
    }
}
