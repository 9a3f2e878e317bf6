//! Abstract Syntax Tree node types
//!
//! Every statement, expression, pattern, function and catch clause carries a
//! [`NodeId`]. Rewriter passes attach their bookkeeping to these identities in
//! side tables instead of on the nodes themselves.

use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

pub mod visit;

/* ===================== Node Identity ===================== */

static NEXT_NODE_ID: AtomicU32 = AtomicU32::new(1);

/// Opaque node identity, unique for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Identity used by placeholders left behind by [`Expr::take`] and friends
    pub const DUMMY: NodeId = NodeId(0);

    pub fn fresh() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/* ===================== Spans ===================== */

/// Source location span for error reporting and source echoes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Span {
    /// Start byte offset
    pub start: usize,
    /// End byte offset
    pub end: usize,
    /// Start line (0-indexed)
    pub start_line: usize,
    /// Start column (0-indexed)
    pub start_col: usize,
    /// End line (0-indexed)
    pub end_line: usize,
    /// End column (0-indexed)
    pub end_col: usize,
}

impl Span {
    pub fn new(
        start: usize,
        end: usize,
        start_line: usize,
        start_col: usize,
        end_line: usize,
        end_col: usize,
    ) -> Self {
        Self {
            start,
            end,
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// Create a span that covers both self and other
    pub fn merge(&self, other: &Span) -> Span {
        let (start_line, start_col) = if self.start <= other.start {
            (self.start_line, self.start_col)
        } else {
            (other.start_line, other.start_col)
        };
        let (end_line, end_col) = if self.end >= other.end {
            (self.end_line, self.end_col)
        } else {
            (other.end_line, other.end_col)
        };
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// Whether this span points at real source text
    pub fn is_synthetic(&self) -> bool {
        self.start == self.end
    }

    /// Slice the source text covered by this span
    pub fn text<'a>(&self, source: &'a str) -> Option<&'a str> {
        if self.is_synthetic() {
            return None;
        }
        source.get(self.start..self.end)
    }
}

pub(crate) fn is_default_span(span: &Span) -> bool {
    *span == Span::default()
}

/* ===================== Operators ===================== */

/// Variable declaration kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarKind {
    Var,
    Let,
    Const,
}

impl VarKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VarKind::Var => "var",
            VarKind::Let => "let",
            VarKind::Const => "const",
        }
    }

    pub fn is_lexical(self) -> bool {
        !matches!(self, VarKind::Var)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Minus,
    Plus,
    Not,
    BitNot,
    Typeof,
    Void,
    Delete,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Minus => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::Typeof => "typeof",
            UnaryOp::Void => "void",
            UnaryOp::Delete => "delete",
        }
    }

    pub fn is_keyword(self) -> bool {
        matches!(self, UnaryOp::Typeof | UnaryOp::Void | UnaryOp::Delete)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateOp {
    Increment,
    Decrement,
}

impl UpdateOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UpdateOp::Increment => "++",
            UpdateOp::Decrement => "--",
        }
    }
}

/// Binary operators (arithmetic, comparison, bitwise)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Exp,
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Shl,
    Shr,
    UShr,
    BitAnd,
    BitOr,
    BitXor,
    In,
    InstanceOf,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Exp => "**",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::StrictEq => "===",
            BinaryOp::StrictNotEq => "!==",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::UShr => ">>>",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::In => "in",
            BinaryOp::InstanceOf => "instanceof",
        }
    }

    pub fn from_token(op: &str) -> Option<Self> {
        Some(match op {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Mod,
            "**" => BinaryOp::Exp,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::NotEq,
            "===" => BinaryOp::StrictEq,
            "!==" => BinaryOp::StrictNotEq,
            "<" => BinaryOp::Lt,
            "<=" => BinaryOp::LtEq,
            ">" => BinaryOp::Gt,
            ">=" => BinaryOp::GtEq,
            "<<" => BinaryOp::Shl,
            ">>" => BinaryOp::Shr,
            ">>>" => BinaryOp::UShr,
            "&" => BinaryOp::BitAnd,
            "|" => BinaryOp::BitOr,
            "^" => BinaryOp::BitXor,
            "in" => BinaryOp::In,
            "instanceof" => BinaryOp::InstanceOf,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOp {
    And,
    Or,
    Nullish,
}

impl LogicalOp {
    pub fn as_str(self) -> &'static str {
        match self {
            LogicalOp::And => "&&",
            LogicalOp::Or => "||",
            LogicalOp::Nullish => "??",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Exp,
    Shl,
    Shr,
    UShr,
    BitAnd,
    BitOr,
    BitXor,
    And,
    Or,
    Nullish,
}

impl AssignOp {
    pub fn as_str(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Mod => "%=",
            AssignOp::Exp => "**=",
            AssignOp::Shl => "<<=",
            AssignOp::Shr => ">>=",
            AssignOp::UShr => ">>>=",
            AssignOp::BitAnd => "&=",
            AssignOp::BitOr => "|=",
            AssignOp::BitXor => "^=",
            AssignOp::And => "&&=",
            AssignOp::Or => "||=",
            AssignOp::Nullish => "??=",
        }
    }

    pub fn from_token(op: &str) -> Option<Self> {
        Some(match op {
            "=" => AssignOp::Assign,
            "+=" => AssignOp::Add,
            "-=" => AssignOp::Sub,
            "*=" => AssignOp::Mul,
            "/=" => AssignOp::Div,
            "%=" => AssignOp::Mod,
            "**=" => AssignOp::Exp,
            "<<=" => AssignOp::Shl,
            ">>=" => AssignOp::Shr,
            ">>>=" => AssignOp::UShr,
            "&=" => AssignOp::BitAnd,
            "|=" => AssignOp::BitOr,
            "^=" => AssignOp::BitXor,
            "&&=" => AssignOp::And,
            "||=" => AssignOp::Or,
            "??=" => AssignOp::Nullish,
            _ => return None,
        })
    }
}

/* ===================== Expressions ===================== */

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expr {
    #[serde(skip, default = "NodeId::fresh")]
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub span: Span,
    pub kind: ExprKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum ExprKind {
    Ident {
        name: String,
    },
    This,
    Super,
    Null,
    Bool {
        value: bool,
    },
    Num {
        raw: String,
    },
    BigInt {
        raw: String,
    },
    /// String literal. `raw` keeps the exact source spelling when there is one.
    Str {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        raw: Option<String>,
    },
    Regex {
        pattern: String,
        flags: String,
    },
    Template {
        tpl: TemplateLit,
    },
    TaggedTemplate {
        tag: Box<Expr>,
        tpl: TemplateLit,
    },
    Array {
        elements: Vec<Option<ExprOrSpread>>,
    },
    Object {
        props: Vec<Prop>,
    },
    Function {
        function: Box<Function>,
    },
    Class {
        class: Box<Class>,
    },
    Unary {
        op: UnaryOp,
        arg: Box<Expr>,
    },
    Update {
        op: UpdateOp,
        prefix: bool,
        arg: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Assign {
        op: AssignOp,
        target: Box<Pattern>,
        value: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<ExprOrSpread>,
        #[serde(default)]
        optional: bool,
    },
    New {
        callee: Box<Expr>,
        args: Vec<ExprOrSpread>,
    },
    Member {
        object: Box<Expr>,
        property: MemberProp,
        #[serde(default)]
        optional: bool,
    },
    Sequence {
        exprs: Vec<Expr>,
    },
    Await {
        arg: Box<Expr>,
    },
    Yield {
        arg: Option<Box<Expr>>,
        delegate: bool,
    },
    /// Dynamic `import(...)`
    Import {
        arg: Box<Expr>,
    },
}

/// Template literal parts. `quasis` holds raw text and has one more entry than `exprs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateLit {
    pub quasis: Vec<String>,
    pub exprs: Vec<Expr>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExprOrSpread {
    #[serde(default)]
    pub spread: bool,
    pub expr: Expr,
}

impl ExprOrSpread {
    pub fn plain(expr: Expr) -> Self {
        Self {
            spread: false,
            expr,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum MemberProp {
    Ident { name: String },
    Computed { expr: Box<Expr> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum PropKey {
    Ident {
        name: String,
    },
    Str {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        raw: Option<String>,
    },
    Num {
        raw: String,
    },
    Computed {
        expr: Box<Expr>,
    },
}

impl PropKey {
    /// Static name of the key, if it has one
    pub fn static_name(&self) -> Option<&str> {
        match self {
            PropKey::Ident { name } => Some(name),
            PropKey::Str { value, .. } => Some(value),
            PropKey::Num { raw } => Some(raw),
            PropKey::Computed { .. } => None,
        }
    }
}

/// Object literal member
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum Prop {
    KeyValue {
        key: PropKey,
        value: Expr,
        #[serde(default)]
        shorthand: bool,
    },
    /// Method, getter or setter (see [`Function::kind`])
    Method {
        key: PropKey,
        function: Box<Function>,
    },
    Spread {
        expr: Expr,
    },
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self {
            id: NodeId::fresh(),
            span,
            kind,
        }
    }

    /// Expression with no source location
    pub fn synth(kind: ExprKind) -> Self {
        Self::new(kind, Span::default())
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Self::synth(ExprKind::Ident { name: name.into() })
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::synth(ExprKind::Str {
            value: value.into(),
            raw: None,
        })
    }

    pub fn boolean(value: bool) -> Self {
        Self::synth(ExprKind::Bool { value })
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Self::synth(ExprKind::Call {
            callee: Box::new(callee),
            args: args.into_iter().map(ExprOrSpread::plain).collect(),
            optional: false,
        })
    }

    pub fn member(object: Expr, name: impl Into<String>) -> Self {
        Self::synth(ExprKind::Member {
            object: Box::new(object),
            property: MemberProp::Ident { name: name.into() },
            optional: false,
        })
    }

    pub fn assign(target: Pattern, value: Expr) -> Self {
        Self::synth(ExprKind::Assign {
            op: AssignOp::Assign,
            target: Box::new(target),
            value: Box::new(value),
        })
    }

    pub fn sequence(exprs: Vec<Expr>) -> Self {
        Self::synth(ExprKind::Sequence { exprs })
    }

    /// Placeholder left behind when a node is moved out of the tree
    pub fn placeholder() -> Self {
        Self {
            id: NodeId::DUMMY,
            span: Span::default(),
            kind: ExprKind::Null,
        }
    }

    /// Move this expression out, leaving a placeholder in its place
    pub fn take(&mut self) -> Expr {
        std::mem::replace(self, Expr::placeholder())
    }

    pub fn as_ident(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Ident { name } => Some(name),
            _ => None,
        }
    }

    pub fn is_string_literal(&self) -> bool {
        matches!(self.kind, ExprKind::Str { .. })
    }
}

/* ===================== Patterns ===================== */

/// Binding or assignment target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pattern {
    #[serde(skip, default = "NodeId::fresh")]
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub span: Span,
    pub kind: PatternKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum PatternKind {
    Ident {
        name: String,
    },
    /// Member expression target (assignment only)
    Expr {
        expr: Box<Expr>,
    },
    Object {
        props: Vec<ObjectPatternProp>,
        rest: Option<Box<Pattern>>,
    },
    Array {
        elements: Vec<Option<Pattern>>,
        rest: Option<Box<Pattern>>,
    },
    Default {
        target: Box<Pattern>,
        default: Box<Expr>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectPatternProp {
    pub key: PropKey,
    pub value: Pattern,
    #[serde(default)]
    pub shorthand: bool,
}

impl Pattern {
    pub fn new(kind: PatternKind, span: Span) -> Self {
        Self {
            id: NodeId::fresh(),
            span,
            kind,
        }
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Self::new(PatternKind::Ident { name: name.into() }, Span::default())
    }

    pub fn as_ident(&self) -> Option<&str> {
        match &self.kind {
            PatternKind::Ident { name } => Some(name),
            _ => None,
        }
    }

    /// Collect every identifier this pattern binds, in source order
    pub fn bound_names(&self, out: &mut Vec<String>) {
        match &self.kind {
            PatternKind::Ident { name } => out.push(name.clone()),
            PatternKind::Expr { .. } => {}
            PatternKind::Object { props, rest } => {
                for prop in props {
                    prop.value.bound_names(out);
                }
                if let Some(rest) = rest {
                    rest.bound_names(out);
                }
            }
            PatternKind::Array { elements, rest } => {
                for element in elements.iter().flatten() {
                    element.bound_names(out);
                }
                if let Some(rest) = rest {
                    rest.bound_names(out);
                }
            }
            PatternKind::Default { target, .. } => target.bound_names(out),
        }
    }
}

/* ===================== Functions & Classes ===================== */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FunctionKind {
    Declaration,
    Expression,
    Arrow,
    Method,
    Getter,
    Setter,
    Constructor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum FunctionBody {
    Block { body: Vec<Stmt> },
    /// Shorthand arrow body
    Expr { expr: Box<Expr> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
    #[serde(skip, default = "NodeId::fresh")]
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub span: Span,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub kind: FunctionKind,
    #[serde(default)]
    pub is_async: bool,
    #[serde(default)]
    pub is_generator: bool,
    pub params: Vec<Pattern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest: Option<Box<Pattern>>,
    pub body: FunctionBody,
}

impl Function {
    /// Names bound by the parameter list
    pub fn param_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for param in &self.params {
            param.bound_names(&mut names);
        }
        if let Some(rest) = &self.rest {
            rest.bound_names(&mut names);
        }
        names
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Class {
    #[serde(skip, default = "NodeId::fresh")]
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub span: Span,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub super_class: Option<Box<Expr>>,
    pub members: Vec<ClassMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassMember {
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub span: Span,
    pub key: PropKey,
    #[serde(default)]
    pub is_static: bool,
    pub function: Function,
}

/* ===================== Statements ===================== */

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stmt {
    #[serde(skip, default = "NodeId::fresh")]
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub span: Span,
    pub kind: StmtKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum StmtKind {
    /// Prologue string such as `"use strict"`, kept verbatim
    Directive {
        raw: String,
    },
    Expr {
        expr: Expr,
    },
    Var {
        decl: VarDecl,
    },
    Function {
        function: Box<Function>,
    },
    Class {
        class: Box<Class>,
    },
    Block {
        body: Vec<Stmt>,
    },
    Empty,
    Debugger,
    If {
        test: Expr,
        consequent: Box<Stmt>,
        alternate: Option<Box<Stmt>>,
    },
    For {
        init: Option<ForInit>,
        test: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
    },
    ForIn {
        left: ForHead,
        right: Expr,
        body: Box<Stmt>,
    },
    ForOf {
        left: ForHead,
        right: Expr,
        body: Box<Stmt>,
        #[serde(default)]
        is_await: bool,
    },
    While {
        test: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        test: Expr,
    },
    Return {
        value: Option<Expr>,
    },
    Break {
        label: Option<String>,
    },
    Continue {
        label: Option<String>,
    },
    Throw {
        value: Expr,
    },
    Try {
        block: Vec<Stmt>,
        handler: Option<CatchClause>,
        finalizer: Option<Vec<Stmt>>,
    },
    Switch {
        discriminant: Expr,
        cases: Vec<SwitchCase>,
    },
    Labeled {
        label: String,
        body: Box<Stmt>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarDecl {
    pub kind: VarKind,
    pub declarations: Vec<VarDeclarator>,
}

impl VarDecl {
    pub fn bound_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for decl in &self.declarations {
            decl.target.bound_names(&mut names);
        }
        names
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarDeclarator {
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub span: Span,
    pub target: Pattern,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum ForInit {
    Var { decl: VarDecl },
    Expr { expr: Expr },
}

/// Left-hand side of `for-in` / `for-of`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum ForHead {
    Var { decl: VarDecl },
    Pattern { pattern: Pattern },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatchClause {
    #[serde(skip, default = "NodeId::fresh")]
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub span: Span,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<Pattern>,
    pub body: Vec<Stmt>,
}

impl CatchClause {
    pub fn new(param: Option<Pattern>, body: Vec<Stmt>) -> Self {
        Self {
            id: NodeId::fresh(),
            span: Span::default(),
            param,
            body,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchCase {
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub span: Span,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<Expr>,
    pub body: Vec<Stmt>,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self {
            id: NodeId::fresh(),
            span,
            kind,
        }
    }

    pub fn synth(kind: StmtKind) -> Self {
        Self::new(kind, Span::default())
    }

    pub fn expr(expr: Expr) -> Self {
        Self::synth(StmtKind::Expr { expr })
    }

    pub fn block(body: Vec<Stmt>) -> Self {
        Self::synth(StmtKind::Block { body })
    }

    pub fn empty() -> Self {
        Self::synth(StmtKind::Empty)
    }

    /// `kind target = init;`
    pub fn var(kind: VarKind, target: Pattern, init: Option<Expr>) -> Self {
        Self::synth(StmtKind::Var {
            decl: VarDecl {
                kind,
                declarations: vec![VarDeclarator {
                    span: Span::default(),
                    target,
                    init,
                }],
            },
        })
    }

    pub fn placeholder() -> Self {
        Self {
            id: NodeId::DUMMY,
            span: Span::default(),
            kind: StmtKind::Empty,
        }
    }

    /// Move this statement out, leaving a placeholder in its place
    pub fn take(&mut self) -> Stmt {
        std::mem::replace(self, Stmt::placeholder())
    }

    pub fn is_directive(&self) -> bool {
        matches!(self.kind, StmtKind::Directive { .. })
    }
}

/// Parsed program (script)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub body: Vec<Stmt>,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub span: Span,
}

/// Split a statement list into its leading directives and the rest
pub fn split_directives(body: Vec<Stmt>) -> (Vec<Stmt>, Vec<Stmt>) {
    let count = body.iter().take_while(|s| s.is_directive()).count();
    let mut directives = body;
    let rest = directives.split_off(count);
    (directives, rest)
}
