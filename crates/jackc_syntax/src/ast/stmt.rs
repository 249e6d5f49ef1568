//! Statement forms: `let`, `if`, `while`, `do`, `return`.

use jackc_base::SourceLoc;

use super::{Expression, SubroutineCall, Symbol};

pub struct Statements<'a> {
    pub statements: &'a [&'a Statement<'a>],
}

pub enum Statement<'a> {
    Let {
        target: Symbol,
        /// `Some` iff this is an array-element assignment: `let v[i] = e`.
        index: Option<&'a Expression<'a>>,
        value: &'a Expression<'a>,
        loc: SourceLoc,
    },
    If {
        cond: &'a Expression<'a>,
        then_branch: &'a Statements<'a>,
        else_branch: Option<&'a Statements<'a>>,
        loc: SourceLoc,
    },
    While {
        cond: &'a Expression<'a>,
        body: &'a Statements<'a>,
        loc: SourceLoc,
    },
    Do {
        call: &'a SubroutineCall<'a>,
        loc: SourceLoc,
    },
    Return {
        value: Option<&'a Expression<'a>>,
        loc: SourceLoc,
    },
}

impl<'a> Statement<'a> {
    pub fn loc(&self) -> SourceLoc {
        match self {
            Statement::Let { loc, .. }
            | Statement::If { loc, .. }
            | Statement::While { loc, .. }
            | Statement::Do { loc, .. }
            | Statement::Return { loc, .. } => *loc,
        }
    }
}
