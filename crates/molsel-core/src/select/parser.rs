use super::error::SelectionError;
use super::macros::MacroRegistry;
use super::token::tokenize;
use crate::core::models::fields::RecordKind;
use std::str::FromStr;

/// Maximum macro expansion depth; a self-referential user macro hits this
/// bound instead of recursing.
const MAX_MACRO_DEPTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StrField {
    Name,
    Resname,
    Chain,
    Segid,
    Insertion,
    Element,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IntField {
    Serial,
    Resid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum IntTest {
    Eq(i64),
    Range(i64, i64),
    Cmp(CmpOp, i64),
}

impl IntTest {
    pub(crate) fn matches(&self, value: i64) -> bool {
        match self {
            IntTest::Eq(v) => value == *v,
            IntTest::Range(lo, hi) => value >= *lo && value <= *hi,
            IntTest::Cmp(CmpOp::Lt, v) => value < *v,
            IntTest::Cmp(CmpOp::Le, v) => value <= *v,
            IntTest::Cmp(CmpOp::Gt, v) => value > *v,
            IntTest::Cmp(CmpOp::Ge, v) => value >= *v,
            IntTest::Cmp(CmpOp::Eq, v) => value == *v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SameGroup {
    Residue,
    Chain,
    Segid,
}

/// Parsed selection predicate tree.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    All,
    None,
    StrIn {
        field: StrField,
        values: Vec<String>,
    },
    IntIn {
        field: IntField,
        tests: Vec<IntTest>,
    },
    RecordIn {
        kinds: Vec<RecordKind>,
    },
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Within {
        distance: f64,
        of: Box<Expr>,
    },
    Same {
        group: SameGroup,
        of: Box<Expr>,
    },
}

fn is_reserved(word: &str) -> bool {
    matches!(
        word.to_ascii_lowercase().as_str(),
        "and"
            | "or"
            | "not"
            | "("
            | ")"
            | "all"
            | "none"
            | "name"
            | "resname"
            | "chain"
            | "segid"
            | "insertion"
            | "element"
            | "serial"
            | "resid"
            | "record"
            | "within"
            | "of"
            | "same"
            | "as"
            | "<"
            | "<="
            | ">"
            | ">="
            | "="
            | "=="
    )
}

fn cmp_op(token: &str) -> Option<CmpOp> {
    match token {
        "<" => Some(CmpOp::Lt),
        "<=" => Some(CmpOp::Le),
        ">" => Some(CmpOp::Gt),
        ">=" => Some(CmpOp::Ge),
        "=" | "==" => Some(CmpOp::Eq),
        _ => None,
    }
}

pub(crate) fn parse(expr: &str, macros: &MacroRegistry) -> Result<Expr, SelectionError> {
    parse_at_depth(expr, macros, 0)
}

fn parse_at_depth(
    expr: &str,
    macros: &MacroRegistry,
    depth: usize,
) -> Result<Expr, SelectionError> {
    let tokens = tokenize(expr);
    if tokens.is_empty() {
        return Err(SelectionError::Parse {
            expr: expr.to_string(),
            pos: 0,
            message: "empty selection".to_string(),
        });
    }
    let mut parser = Parser {
        expr,
        tokens,
        pos: 0,
        macros,
        depth,
    };
    let root = parser.parse_or()?;
    if parser.pos < parser.tokens.len() {
        let trailing = parser.tokens[parser.pos].clone();
        return Err(parser.error(format!("unexpected trailing token '{trailing}'")));
    }
    Ok(root)
}

struct Parser<'a> {
    expr: &'a str,
    tokens: Vec<String>,
    pos: usize,
    macros: &'a MacroRegistry,
    depth: usize,
}

impl Parser<'_> {
    fn error(&self, message: String) -> SelectionError {
        SelectionError::Parse {
            expr: self.expr.to_string(),
            pos: self.pos,
            message,
        }
    }

    fn peek(&self) -> Option<&str> {
        self.tokens.get(self.pos).map(|s| s.as_str())
    }

    fn peek_is(&self, keyword: &str) -> bool {
        self.peek()
            .map(|t| t.eq_ignore_ascii_case(keyword))
            .unwrap_or(false)
    }

    fn next(&mut self) -> Option<String> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, keyword: &str) -> Result<(), SelectionError> {
        if self.peek_is(keyword) {
            self.next();
            Ok(())
        } else {
            Err(self.error(format!("expected '{keyword}'")))
        }
    }

    fn parse_or(&mut self) -> Result<Expr, SelectionError> {
        let mut left = self.parse_and()?;
        while self.peek_is("or") {
            self.next();
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, SelectionError> {
        let mut left = self.parse_not()?;
        while self.peek_is("and") {
            self.next();
            let right = self.parse_not()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, SelectionError> {
        if self.peek_is("not") {
            self.next();
            let inner = self.parse_not()?;
            Ok(Expr::Not(Box::new(inner)))
        } else {
            self.parse_primary()
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, SelectionError> {
        let token = match self.peek() {
            Some(t) => t.to_string(),
            None => return Err(self.error("unexpected end of selection".to_string())),
        };
        match token.to_ascii_lowercase().as_str() {
            "(" => {
                self.next();
                let inner = self.parse_or()?;
                self.expect(")")?;
                Ok(inner)
            }
            "all" => {
                self.next();
                Ok(Expr::All)
            }
            "none" => {
                self.next();
                Ok(Expr::None)
            }
            "name" => self.parse_str_predicate(StrField::Name),
            "resname" => self.parse_str_predicate(StrField::Resname),
            "chain" => self.parse_str_predicate(StrField::Chain),
            "segid" => self.parse_str_predicate(StrField::Segid),
            "insertion" => self.parse_str_predicate(StrField::Insertion),
            "element" => self.parse_str_predicate(StrField::Element),
            "serial" => self.parse_int_predicate(IntField::Serial),
            "resid" => self.parse_int_predicate(IntField::Resid),
            "record" => {
                self.next();
                let values = self.parse_values("record")?;
                let mut kinds = Vec::with_capacity(values.len());
                for value in values {
                    let kind = RecordKind::from_str(&value)
                        .map_err(|e| self.error(e.to_string()))?;
                    kinds.push(kind);
                }
                Ok(Expr::RecordIn { kinds })
            }
            "within" => {
                self.next();
                let distance_token = self
                    .next()
                    .ok_or_else(|| self.error("expected a distance after 'within'".to_string()))?;
                let distance: f64 = distance_token
                    .parse()
                    .map_err(|_| self.error(format!("invalid distance '{distance_token}'")))?;
                if distance < 0.0 {
                    return Err(self.error(format!("distance must be non-negative, got {distance}")));
                }
                self.expect("of")?;
                let of = self.parse_primary()?;
                Ok(Expr::Within {
                    distance,
                    of: Box::new(of),
                })
            }
            "same" => {
                self.next();
                let group_token = self
                    .next()
                    .ok_or_else(|| self.error("expected a group after 'same'".to_string()))?;
                let group = match group_token.to_ascii_lowercase().as_str() {
                    "residue" => SameGroup::Residue,
                    "chain" => SameGroup::Chain,
                    "segid" => SameGroup::Segid,
                    _ => {
                        return Err(self.error(format!(
                            "expected 'residue', 'chain', or 'segid' after 'same', got '{group_token}'"
                        )));
                    }
                };
                self.expect("as")?;
                let of = self.parse_primary()?;
                Ok(Expr::Same {
                    group,
                    of: Box::new(of),
                })
            }
            _ => {
                let body = self.macros.lookup(&token).map(|b| b.to_string());
                match body {
                    Some(body) => {
                        if self.depth >= MAX_MACRO_DEPTH {
                            return Err(
                                self.error(format!("macro expansion too deep at '{token}'"))
                            );
                        }
                        self.next();
                        parse_at_depth(&body, self.macros, self.depth + 1)
                    }
                    None => Err(SelectionError::Semantic {
                        expr: self.expr.to_string(),
                        word: token,
                    }),
                }
            }
        }
    }

    fn parse_str_predicate(&mut self, field: StrField) -> Result<Expr, SelectionError> {
        let keyword = self.next().unwrap_or_default();
        let values = self.parse_values(&keyword)?;
        Ok(Expr::StrIn { field, values })
    }

    fn parse_int_predicate(&mut self, field: IntField) -> Result<Expr, SelectionError> {
        let keyword = self.next().unwrap_or_default();
        if let Some(op) = self.peek().and_then(cmp_op) {
            self.next();
            let value_token = self
                .next()
                .ok_or_else(|| self.error("expected an integer after comparison".to_string()))?;
            let value: i64 = value_token
                .parse()
                .map_err(|_| self.error(format!("invalid integer '{value_token}'")))?;
            return Ok(Expr::IntIn {
                field,
                tests: vec![IntTest::Cmp(op, value)],
            });
        }
        let values = self.parse_values(&keyword)?;
        let mut tests = Vec::with_capacity(values.len());
        for value in values {
            tests.push(self.parse_int_test(&keyword, &value)?);
        }
        Ok(Expr::IntIn { field, tests })
    }

    fn parse_int_test(&self, keyword: &str, value: &str) -> Result<IntTest, SelectionError> {
        let invalid =
            || self.error(format!("invalid integer or range '{value}' for '{keyword}'"));
        // "a:b" anywhere, or "a-b" with the separator past the sign position.
        let split = value
            .find(':')
            .or_else(|| value[1..].find('-').map(|i| i + 1));
        if let Some(sep) = split {
            let lo: i64 = value[..sep].parse().map_err(|_| invalid())?;
            let hi: i64 = value[sep + 1..].parse().map_err(|_| invalid())?;
            if lo > hi {
                return Err(self.error(format!("empty range '{value}' for '{keyword}'")));
            }
            Ok(IntTest::Range(lo, hi))
        } else {
            let v: i64 = value.parse().map_err(|_| invalid())?;
            Ok(IntTest::Eq(v))
        }
    }

    /// Consumes one or more plain values (`name CA CB C`), stopping at any
    /// reserved word or known macro name.
    fn parse_values(&mut self, keyword: &str) -> Result<Vec<String>, SelectionError> {
        let mut values = Vec::new();
        loop {
            let stop = match self.peek() {
                None => true,
                Some(t) => is_reserved(t) || self.macros.contains(t),
            };
            if stop {
                break;
            }
            if let Some(value) = self.next() {
                values.push(value);
            }
        }
        if values.is_empty() {
            return Err(self.error(format!("expected at least one value after '{keyword}'")));
        }
        Ok(values)
    }
}
