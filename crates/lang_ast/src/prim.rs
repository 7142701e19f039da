use derive_more::Display;

/// Scalar primitive operators. Their typing rules live in the checker's
/// primitive table.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Prim {
    #[display("add")]
    Add,
    #[display("sub")]
    Sub,
    #[display("mul")]
    Mul,
    #[display("div")]
    Div,
    #[display("mod")]
    Mod,
    #[display("pow")]
    Pow,
    #[display("max")]
    Max,
    #[display("min")]
    Min,

    #[display("eq")]
    Eq,
    #[display("not_eq")]
    NotEq,
    #[display("lt")]
    Lt,
    #[display("lt_e")]
    LtE,
    #[display("gt")]
    Gt,
    #[display("gt_e")]
    GtE,

    #[display("and")]
    And,
    #[display("or")]
    Or,
    #[display("not")]
    Not,

    #[display("neg")]
    Neg,
    #[display("abs")]
    Abs,

    #[display("sqrt")]
    Sqrt,
    #[display("exp")]
    Exp,
    #[display("log")]
    Log,
    #[display("sin")]
    Sin,
    #[display("cos")]
    Cos,
}

impl Prim {
    pub const ALL: [Prim; 24] = [
        Prim::Add,
        Prim::Sub,
        Prim::Mul,
        Prim::Div,
        Prim::Mod,
        Prim::Pow,
        Prim::Max,
        Prim::Min,
        Prim::Eq,
        Prim::NotEq,
        Prim::Lt,
        Prim::LtE,
        Prim::Gt,
        Prim::GtE,
        Prim::And,
        Prim::Or,
        Prim::Not,
        Prim::Neg,
        Prim::Abs,
        Prim::Sqrt,
        Prim::Exp,
        Prim::Log,
        Prim::Sin,
        Prim::Cos,
    ];

    pub fn from_name(name: &str) -> Option<Prim> {
        Prim::ALL.into_iter().find(|prim| prim.to_string() == name)
    }
}
