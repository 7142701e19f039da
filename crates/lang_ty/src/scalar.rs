use derive_more::Display;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScalarTy {
    #[display("bool")]
    Bool,
    #[display("i8")]
    I8,
    #[display("i16")]
    I16,
    #[display("i32")]
    I32,
    #[display("i64")]
    I64,
    #[display("u8")]
    U8,
    #[display("u16")]
    U16,
    #[display("u32")]
    U32,
    #[display("u64")]
    U64,
    #[display("f32")]
    F32,
    #[display("f64")]
    F64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarCategory {
    Bool,
    Signed,
    Unsigned,
    Float,
}

impl ScalarTy {
    pub const ALL: [ScalarTy; 11] = [
        ScalarTy::Bool,
        ScalarTy::I8,
        ScalarTy::I16,
        ScalarTy::I32,
        ScalarTy::I64,
        ScalarTy::U8,
        ScalarTy::U16,
        ScalarTy::U32,
        ScalarTy::U64,
        ScalarTy::F32,
        ScalarTy::F64,
    ];

    pub fn category(self) -> ScalarCategory {
        match self {
            ScalarTy::Bool => ScalarCategory::Bool,
            ScalarTy::I8 | ScalarTy::I16 | ScalarTy::I32 | ScalarTy::I64 => ScalarCategory::Signed,
            ScalarTy::U8 | ScalarTy::U16 | ScalarTy::U32 | ScalarTy::U64 => {
                ScalarCategory::Unsigned
            }
            ScalarTy::F32 | ScalarTy::F64 => ScalarCategory::Float,
        }
    }

    /// Storage width in bits. Bools are stored as a byte.
    pub fn bits(self) -> u8 {
        match self {
            ScalarTy::Bool | ScalarTy::I8 | ScalarTy::U8 => 8,
            ScalarTy::I16 | ScalarTy::U16 => 16,
            ScalarTy::I32 | ScalarTy::U32 | ScalarTy::F32 => 32,
            ScalarTy::I64 | ScalarTy::U64 | ScalarTy::F64 => 64,
        }
    }

    pub fn is_bool(self) -> bool {
        matches!(self, ScalarTy::Bool)
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self.category(),
            ScalarCategory::Signed | ScalarCategory::Unsigned
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self.category(), ScalarCategory::Float)
    }

    pub fn signed(bits: u8) -> ScalarTy {
        match bits {
            0..=8 => ScalarTy::I8,
            9..=16 => ScalarTy::I16,
            17..=32 => ScalarTy::I32,
            _ => ScalarTy::I64,
        }
    }

    pub fn from_name(name: &str) -> Option<ScalarTy> {
        ScalarTy::ALL
            .into_iter()
            .find(|scalar| scalar.to_string() == name)
    }
}

// ==============================================================================
// Numeric promotion
// ==============================================================================
//
// Every scalar join in the lattice goes through a PromotionPolicy. New scalar
// kinds only need to be taught to the policy; `combine` never inspects kinds
// itself.

/// Join of two scalar kinds. Implementations must be total, commutative and
/// idempotent.
pub trait PromotionPolicy {
    fn join(&self, lhs: ScalarTy, rhs: ScalarTy) -> ScalarTy;
}

/// Promotion in the style of numpy's `result_type`:
/// - bool yields to any other kind
/// - integers joined with floats become floats (f32 only for 8/16 bit ints)
/// - within one category the wider width wins
/// - signed with unsigned picks a signed kind wide enough for both, capped at i64
#[derive(Debug, Default, Clone, Copy)]
pub struct NumpyPromotion;

impl PromotionPolicy for NumpyPromotion {
    fn join(&self, lhs: ScalarTy, rhs: ScalarTy) -> ScalarTy {
        use ScalarCategory::*;

        if lhs == rhs {
            return lhs;
        }

        match (lhs.category(), rhs.category()) {
            (Bool, _) => rhs,
            (_, Bool) => lhs,
            (Signed, Signed) | (Unsigned, Unsigned) | (Float, Float) => {
                if lhs.bits() >= rhs.bits() {
                    lhs
                } else {
                    rhs
                }
            }
            (Float, Signed | Unsigned) => join_int_float(rhs, lhs),
            (Signed | Unsigned, Float) => join_int_float(lhs, rhs),
            (Signed, Unsigned) => join_signed_unsigned(lhs, rhs),
            (Unsigned, Signed) => join_signed_unsigned(rhs, lhs),
        }
    }
}

fn join_int_float(int: ScalarTy, float: ScalarTy) -> ScalarTy {
    if float == ScalarTy::F32 && int.bits() <= 16 {
        ScalarTy::F32
    } else {
        ScalarTy::F64
    }
}

fn join_signed_unsigned(signed: ScalarTy, unsigned: ScalarTy) -> ScalarTy {
    let needed = unsigned.bits().saturating_mul(2).min(64);
    ScalarTy::signed(signed.bits().max(needed))
}
