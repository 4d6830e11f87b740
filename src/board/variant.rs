//! Variant rule policies.
//!
//! A single `Board` type serves every supported variant; the rules that
//! differ (capture side effects, promotion pieces, castling, drops, win
//! conditions) are expressed as policy methods on `Variant` and consulted
//! by apply/generate/validate, instead of a board subclass per variant.

use super::types::Piece;

/// Which rule set a board is played under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Variant {
    /// Orthodox chess.
    #[default]
    Standard,
    /// Captures detonate: the capturing piece and all adjacent non-pawns
    /// are removed along with the captured piece.
    Atomic,
    /// Losing chess: captures are mandatory, there is no check concept.
    Suicide,
    /// Chess960 starting positions. Castling safety rules are unchanged;
    /// only the home squares are relaxed.
    FischerRandom,
}

impl Variant {
    /// Does a capture remove more than the captured piece?
    #[inline]
    #[must_use]
    pub(crate) const fn explodes_on_capture(self) -> bool {
        matches!(self, Variant::Atomic)
    }

    /// If any legal capture exists, are non-captures illegal?
    #[inline]
    #[must_use]
    pub(crate) const fn captures_mandatory(self) -> bool {
        matches!(self, Variant::Suicide)
    }

    /// Is the check/checkmate concept in force? Suicide chess treats the
    /// king as an ordinary piece.
    #[inline]
    #[must_use]
    pub(crate) const fn has_check(self) -> bool {
        !matches!(self, Variant::Suicide)
    }

    /// Is castling part of the rules at all?
    #[inline]
    #[must_use]
    pub(crate) const fn allows_castling(self) -> bool {
        !matches!(self, Variant::Suicide)
    }

    /// May the king capture? Atomic kings would blow themselves up.
    #[inline]
    #[must_use]
    pub(crate) const fn king_may_capture(self) -> bool {
        !matches!(self, Variant::Atomic)
    }

    /// Pieces a pawn may promote to under this rule set.
    ///
    /// Suicide chess additionally allows king promotion over the board, but
    /// that is not representable in the 16-bit move encoding; the standard
    /// four are offered (see DESIGN.md).
    #[inline]
    #[must_use]
    pub(crate) const fn promotion_pieces(self) -> &'static [Piece] {
        &[Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight]
    }

    /// Are piece drops legal? No holdings-tracking variant is carried, so
    /// drop moves are uniformly rejected; the encoding reserves the flag.
    #[inline]
    #[must_use]
    pub(crate) const fn allows_drops(self) -> bool {
        false
    }
}
