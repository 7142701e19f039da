use std::fmt::{self, Write};

use itertools::Itertools;

use crate::{Const, PhiNode, TypedExpr, TypedExprKind, TypedFn, TypedStmt};

impl fmt::Display for Const {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Const::Bool(b) => write!(f, "{b}"),
            Const::Int(i) => write!(f, "{i}"),
            Const::Float(x) => write!(f, "{:?}", x.0),
            Const::None => write!(f, "none"),
        }
    }
}

// ==============================================================================
// Expressions
// ==============================================================================
//
// Expressions print without their types; statements that bind or return a
// value print the type alongside.

impl fmt::Display for TypedExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypedExprKind::Var(name) => write!(f, "{name}"),
            TypedExprKind::Const(c) => write!(f, "{c}"),
            TypedExprKind::Tuple(elems) if elems.len() == 1 => write!(f, "({},)", elems[0]),
            TypedExprKind::Tuple(elems) => write!(f, "({})", elems.iter().join(", ")),
            TypedExprKind::Array(elems) => write!(f, "[{}]", elems.iter().join(", ")),
            TypedExprKind::Index { value, index } => write!(f, "{value}[{index}]"),
            TypedExprKind::TupleProj { tuple, index } => write!(f, "{tuple}.{index}"),
            TypedExprKind::Slice { start, stop, step } => write!(f, "{start}:{stop}:{step}"),
            TypedExprKind::Attribute { value, name } => write!(f, "{value}.{name}"),
            TypedExprKind::PrimCall { prim, args } => {
                write!(f, "{prim}({})", args.iter().join(", "))
            }
            TypedExprKind::Closure { func, args } if args.is_empty() => write!(f, "{func}"),
            TypedExprKind::Closure { func, args } => {
                write!(f, "closure({func}, {})", args.iter().join(", "))
            }
            TypedExprKind::Invoke { closure, args } => {
                write!(f, "{closure}({})", args.iter().join(", "))
            }
            TypedExprKind::Map { func, args, axis } => {
                fmt_adverb(f, "map", func, args, *axis, None)
            }
            TypedExprKind::Reduce {
                func,
                args,
                axis,
                combine,
            } => fmt_adverb(f, "reduce", func, args, *axis, combine.as_deref()),
            TypedExprKind::Scan {
                func,
                args,
                axis,
                combine,
            } => fmt_adverb(f, "scan", func, args, *axis, combine.as_deref()),
            TypedExprKind::AllPairs { func, args, axis } => {
                fmt_adverb(f, "allpairs", func, args, *axis, None)
            }
        }
    }
}

fn fmt_adverb(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    func: &TypedExpr,
    args: &[TypedExpr],
    axis: Option<usize>,
    combine: Option<&TypedExpr>,
) -> fmt::Result {
    write!(f, "{name}({func}")?;
    for arg in args {
        write!(f, ", {arg}")?;
    }
    if let Some(axis) = axis {
        write!(f, ", axis={axis}")?;
    }
    if let Some(combine) = combine {
        write!(f, ", combine={combine}")?;
    }
    write!(f, ")")
}

// ==============================================================================
// Statements
// ==============================================================================

struct Printer<'a, W> {
    out: &'a mut W,
    indent: usize,
}

impl<W: Write> Printer<'_, W> {
    fn line(&mut self, args: fmt::Arguments<'_>) -> fmt::Result {
        for _ in 0..self.indent {
            self.out.write_str("    ")?;
        }
        self.out.write_fmt(args)?;
        self.out.write_char('\n')
    }

    fn block(&mut self, stmts: &[TypedStmt]) -> fmt::Result {
        self.indent += 1;
        if stmts.is_empty() {
            self.line(format_args!("pass"))?;
        }
        for stmt in stmts {
            self.stmt(stmt)?;
        }
        self.indent -= 1;
        Ok(())
    }

    fn phis(&mut self, merge: &[PhiNode<TypedExpr>]) -> fmt::Result {
        for node in merge {
            self.line(format_args!(
                "{} = phi({}, {}) : {}",
                node.var,
                node.left,
                node.right,
                node.left.ty.combine(&node.right.ty).unwrap_or(node.left.ty.clone()),
            ))?;
        }
        Ok(())
    }

    fn stmt(&mut self, stmt: &TypedStmt) -> fmt::Result {
        match stmt {
            TypedStmt::Assign { lhs, rhs } => {
                self.line(format_args!("{lhs} = {rhs} : {}", rhs.ty))
            }
            TypedStmt::Return(value) => self.line(format_args!("return {value} : {}", value.ty)),
            TypedStmt::If {
                cond,
                true_block,
                false_block,
                merge,
            } => {
                self.line(format_args!("if {cond}:"))?;
                self.block(true_block)?;
                self.line(format_args!("else:"))?;
                self.block(false_block)?;
                self.phis(merge)
            }
            TypedStmt::While { cond, body, merge } => {
                self.line(format_args!("while {cond}:"))?;
                self.indent += 1;
                self.phis(merge)?;
                self.indent -= 1;
                self.block(body)
            }
        }
    }
}

impl fmt::Display for TypedStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Printer { out: f, indent: 0 }.stmt(self)
    }
}

impl fmt::Display for TypedFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self
            .params
            .names()
            .map(|name| match self.type_env.get(name) {
                Some(ty) => format!("{name}: {ty}"),
                None => name.to_string(),
            })
            .join(", ");

        writeln!(f, "def {}({params}) -> {}:", self.name, self.return_type)?;
        Printer { out: f, indent: 0 }.block(&self.body)
    }
}
