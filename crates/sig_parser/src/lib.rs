use std::collections::BTreeMap;

use lang_ty::{ClosureSet, ClosureTy, ScalarTy, StructTy, Ty};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use smol_str::SmolStr;
use thiserror::Error;

#[derive(Parser)]
#[grammar = "sig.pest"]
struct SigParser;

#[derive(Debug, Error)]
pub enum SigError {
    // boxed since pest's error is large
    #[error(transparent)]
    Parse(#[from] Box<pest::error::Error<Rule>>),

    #[error("{message} at {start}..{end}")]
    Collect {
        message: String,
        start: usize,
        end: usize,
    },
}

impl SigError {
    fn at(pair: &Pair<'_, Rule>, message: impl Into<String>) -> Self {
        let span = pair.as_span();
        SigError::Collect {
            message: message.into(),
            start: span.start(),
            end: span.end(),
        }
    }

    /// Byte range of the offending input.
    pub fn span(&self) -> (usize, usize) {
        match self {
            SigError::Parse(err) => match &err.location {
                pest::error::InputLocation::Pos(pos) => (*pos, *pos),
                pest::error::InputLocation::Span(span) => *span,
            },
            SigError::Collect { start, end, .. } => (*start, *end),
        }
    }
}

/// Parse a single type, e.g. `array<f64, 2>`.
pub fn parse_ty(src: &str) -> Result<Ty, SigError> {
    let pairs = SigParser::parse(Rule::signature, src).map_err(Box::new)?;
    collect_tys(pairs.flat_map(Pair::into_inner))?
        .into_iter()
        .next()
        .ok_or_else(|| SigError::Collect {
            message: "expected a type".into(),
            start: 0,
            end: src.len(),
        })
}

/// Parse a comma separated list of types. The empty string is the empty list.
pub fn parse_tys(src: &str) -> Result<Vec<Ty>, SigError> {
    let pairs = SigParser::parse(Rule::signature_list, src).map_err(Box::new)?;
    collect_tys(pairs.flat_map(Pair::into_inner))
}

fn collect_tys<'a>(pairs: impl Iterator<Item = Pair<'a, Rule>>) -> Result<Vec<Ty>, SigError> {
    pairs
        .filter(|pair| pair.as_rule() != Rule::EOI)
        .map(collect_ty)
        .collect()
}

fn collect_ty(pair: Pair<'_, Rule>) -> Result<Ty, SigError> {
    match pair.as_rule() {
        // transparent wrapper
        Rule::ty => {
            let inner = pair
                .clone()
                .into_inner()
                .next()
                .ok_or_else(|| SigError::at(&pair, "empty type"))?;
            collect_ty(inner)
        }

        Rule::scalar => collect_scalar(&pair).map(Ty::Scalar),
        Rule::none_ty => Ok(Ty::None),
        Rule::unknown => Ok(Ty::Unknown),

        Rule::array_ty => {
            let mut inner = pair.clone().into_inner();
            let (Some(elem), Some(rank)) = (inner.next(), inner.next()) else {
                return Err(SigError::at(&pair, "malformed array type"));
            };
            let elem = collect_scalar(&elem)?;
            let rank: usize = rank
                .as_str()
                .parse()
                .map_err(|_| SigError::at(&rank, "array rank out of range"))?;
            if rank == 0 {
                return Err(SigError::at(&pair, "array rank must be at least 1"));
            }
            Ok(Ty::array(elem, rank))
        }

        Rule::slice_ty => {
            let parts = collect_tys(pair.clone().into_inner())?;
            let [start, stop, step]: [Ty; 3] = parts
                .try_into()
                .map_err(|_| SigError::at(&pair, "slice takes three types"))?;
            Ok(Ty::slice(start, stop, step))
        }

        Rule::closure_ty => collect_closure(pair).map(Ty::Closure),

        Rule::closure_set => {
            let closures = pair
                .clone()
                .into_inner()
                .map(collect_closure)
                .collect::<Result<Vec<_>, _>>()?;
            ClosureSet::from_closures(closures)
                .map(Ty::ClosureSet)
                .ok_or_else(|| SigError::at(&pair, "empty closure set"))
        }

        Rule::tuple_ty => collect_tys(pair.into_inner()).map(Ty::Tuple),

        Rule::struct_ty => {
            let mut fields = BTreeMap::new();
            for field in pair.into_inner() {
                let mut inner = field.clone().into_inner();
                let (Some(name), Some(ty)) = (inner.next(), inner.next()) else {
                    return Err(SigError::at(&field, "malformed field"));
                };
                let name = SmolStr::from(name.as_str());
                if fields.insert(name.clone(), collect_ty(ty)?).is_some() {
                    return Err(SigError::at(&field, format!("duplicate field `{name}`")));
                }
            }
            Ok(Ty::Struct(StructTy::from_fields(fields)))
        }

        other => Err(SigError::at(&pair, format!("unexpected {other:?}"))),
    }
}

fn collect_scalar(pair: &Pair<'_, Rule>) -> Result<ScalarTy, SigError> {
    ScalarTy::from_name(pair.as_str())
        .ok_or_else(|| SigError::at(pair, format!("unknown scalar `{}`", pair.as_str())))
}

fn collect_closure(pair: Pair<'_, Rule>) -> Result<ClosureTy, SigError> {
    let mut inner = pair.clone().into_inner();
    let func = inner
        .next()
        .ok_or_else(|| SigError::at(&pair, "closure without a function"))?;
    let args = collect_tys(inner)?;
    Ok(ClosureTy::new(func.as_str(), args))
}
