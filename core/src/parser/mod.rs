//! PEST-based parser for the script subset handled by the rewriter
//!
//! Produces the AST in [`crate::ast`], with span information for error
//! reporting and for echoing original source text into rewritten code.

use pest::iterators::Pair;
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest::Parser;
use pest_derive::Parser;

use crate::ast::{
    AssignOp, BinaryOp, CatchClause, Class, ClassMember, Expr, ExprKind,
    ExprOrSpread, ForHead, ForInit, Function, FunctionBody, FunctionKind, LogicalOp, MemberProp,
    ObjectPatternProp, Pattern, PatternKind, Program, Prop, PropKey, Span, Stmt, StmtKind,
    SwitchCase, TemplateLit, UnaryOp, UpdateOp, VarDecl, VarDeclarator, VarKind,
};

pub mod semantic_validator;

#[cfg(test)]
mod tests;

/* ===================== PEST Parser ===================== */

#[derive(Parser)]
#[grammar = "parser/js.pest"]
struct ScriptParser;

type RulePair<'i> = Pair<'i, Rule>;

/* ===================== Error Types ===================== */

#[derive(Debug)]
pub enum ParseError {
    PestError(String, Option<Span>),
    BuildError(String, Option<Span>),
}

impl ParseError {
    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::PestError(_, span) => *span,
            ParseError::BuildError(_, span) => *span,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ParseError::PestError(msg, _) => msg,
            ParseError::BuildError(msg, _) => msg,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::PestError(msg, _) => write!(f, "{}", msg),
            ParseError::BuildError(msg, Some(span)) => write!(
                f,
                "{} (line {}, col {})",
                msg,
                span.start_line + 1,
                span.start_col + 1
            ),
            ParseError::BuildError(msg, None) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<pest::error::Error<Rule>> for ParseError {
    fn from(err: pest::error::Error<Rule>) -> Self {
        let span = match err.line_col {
            pest::error::LineColLocation::Pos((line, col)) => Some(Span {
                start: 0,
                end: 0,
                start_line: line.saturating_sub(1),
                start_col: col.saturating_sub(1),
                end_line: line.saturating_sub(1),
                end_col: col,
            }),
            pest::error::LineColLocation::Span((start_line, start_col), (end_line, end_col)) => {
                Some(Span {
                    start: 0,
                    end: 0,
                    start_line: start_line.saturating_sub(1),
                    start_col: start_col.saturating_sub(1),
                    end_line: end_line.saturating_sub(1),
                    end_col: end_col.saturating_sub(1),
                })
            }
        };
        ParseError::PestError(err.to_string(), span)
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/* ===================== Public API ===================== */

/// Deepest bracket nesting accepted by the parser
pub const MAX_NESTING_DEPTH: usize = 128;

/// Stack reserved for the recursive descent over one source
const PARSER_STACK_SIZE: usize = 64 * 1024 * 1024;

/// Parse a script into a program
pub fn parse_program(source: &str) -> ParseResult<Program> {
    check_nesting(source)?;
    on_parser_stack(|| build_program(source))
}

/// Parse a single expression
pub fn parse_expression(source: &str) -> ParseResult<Expr> {
    check_nesting(source)?;
    on_parser_stack(|| build_expression(source))
}

/// Run a parse on a thread whose stack fits [`MAX_NESTING_DEPTH`] levels
fn on_parser_stack<T, F>(parse: F) -> ParseResult<T>
where
    T: Send,
    F: FnOnce() -> ParseResult<T> + Send,
{
    std::thread::scope(|scope| {
        let handle = std::thread::Builder::new()
            .name("parser".to_string())
            .stack_size(PARSER_STACK_SIZE)
            .spawn_scoped(scope, parse)
            .map_err(|err| {
                ParseError::BuildError(format!("Failed to start parser thread: {}", err), None)
            })?;
        handle.join().unwrap_or_else(|_| {
            Err(ParseError::BuildError(
                "Parser thread panicked".to_string(),
                None,
            ))
        })
    })
}

fn build_program(source: &str) -> ParseResult<Program> {
    let mut pairs = ScriptParser::parse(Rule::program, source)?;
    let builder = Builder::new(source);

    let program = required(pairs.next(), "program", None)?;
    let span = builder.span(&program);
    let mut body = Vec::new();
    for pair in program.into_inner() {
        if pair.as_rule() == Rule::EOI {
            continue;
        }
        body.push(builder.statement(pair)?);
    }
    builder.mark_directives(&mut body);

    Ok(Program { body, span })
}

fn build_expression(source: &str) -> ParseResult<Expr> {
    let mut pairs = ScriptParser::parse(Rule::expression_only, source)?;
    let builder = Builder::new(source);

    let wrapper = required(pairs.next(), "expression", None)?;
    let span = builder.span(&wrapper);
    let expr_pair = required(
        wrapper.into_inner().find(|p| p.as_rule() == Rule::expression),
        "expression",
        Some(span),
    )?;
    builder.expr(expr_pair)
}

/* ===================== Nesting Limit ===================== */

#[derive(Clone, Copy, PartialEq, Eq)]
enum Opener {
    Bracket,
    /// `${` inside a template literal
    Substitution,
}

type SourceChars<'s> = std::iter::Peekable<std::str::CharIndices<'s>>;

/// Reject sources nested deeper than [`MAX_NESTING_DEPTH`]
///
/// A lexical pre-pass over brackets that skips strings, comments, regex
/// literals and template text. Regex detection looks at the previous
/// significant character only.
fn check_nesting(source: &str) -> ParseResult<()> {
    let mut stack = Vec::new();
    let mut chars = source.char_indices().peekable();
    let mut last = None;

    while let Some((offset, ch)) = chars.next() {
        let next = chars.peek().map(|&(_, c)| c);
        match ch {
            '"' | '\'' => skip_string(&mut chars, ch),
            '`' => {
                if skip_template(&mut chars) {
                    stack.push(Opener::Substitution);
                }
            }
            '/' if next == Some('/') => {
                while chars.next_if(|&(_, c)| c != '\n').is_some() {}
                continue;
            }
            '/' if next == Some('*') => {
                chars.next();
                let mut prev = ' ';
                for (_, c) in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
                continue;
            }
            '/' if regex_allowed(last) => skip_regex(&mut chars),
            '(' | '[' | '{' => stack.push(Opener::Bracket),
            ')' | ']' | '}' => {
                if stack.pop() == Some(Opener::Substitution) && skip_template(&mut chars) {
                    stack.push(Opener::Substitution);
                }
            }
            c if c.is_whitespace() => continue,
            _ => {}
        }
        if stack.len() > MAX_NESTING_DEPTH {
            let lines = LineIndex::new(source);
            let (line, col) = lines.offset_to_line_col(source, offset);
            return Err(ParseError::BuildError(
                format!(
                    "Nesting deeper than {} levels is not supported",
                    MAX_NESTING_DEPTH
                ),
                Some(Span::new(offset, offset + ch.len_utf8(), line, col, line, col + 1)),
            ));
        }
        last = Some(ch);
    }
    Ok(())
}

/// A `/` after these starts a regex rather than a division
fn regex_allowed(last: Option<char>) -> bool {
    last.map_or(true, |c| "(,=:[!&|?{};+-*%<>~^".contains(c))
}

fn skip_string(chars: &mut SourceChars<'_>, quote: char) {
    while let Some((_, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '\n' => return,
            c if c == quote => return,
            _ => {}
        }
    }
}

/// Skip template text; true when stopped at a `${`
fn skip_template(chars: &mut SourceChars<'_>) -> bool {
    while let Some((_, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '`' => return false,
            '$' if chars.next_if(|&(_, c)| c == '{').is_some() => return true,
            _ => {}
        }
    }
    false
}

fn skip_regex(chars: &mut SourceChars<'_>) {
    let mut in_class = false;
    while let Some((_, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '[' => in_class = true,
            ']' => in_class = false,
            '/' if !in_class => return,
            '\n' => return,
            _ => {}
        }
    }
}

/* ===================== Span Helpers ===================== */

/// Byte offsets of every line start, for offset to line/column conversion
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let mut starts = vec![0];
        for (idx, ch) in source.char_indices() {
            if ch == '\n' {
                starts.push(idx + 1);
            }
        }
        Self { starts }
    }

    /// Convert byte offset to (line, column) - 0-indexed, columns in chars
    fn offset_to_line_col(&self, source: &str, offset: usize) -> (usize, usize) {
        let line = match self.starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next.saturating_sub(1),
        };
        let line_start = self.starts[line];
        let col = source
            .get(line_start..offset)
            .map(|s| s.chars().count())
            .unwrap_or(0);
        (line, col)
    }
}

fn required<T>(value: Option<T>, what: &str, span: Option<Span>) -> ParseResult<T> {
    value.ok_or_else(|| ParseError::BuildError(format!("Expected {}", what), span))
}

/// Keyword tokens that carry no information beyond the enclosing rule
fn is_keyword_token(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::k_break
            | Rule::k_case
            | Rule::k_catch
            | Rule::k_class
            | Rule::k_continue
            | Rule::k_debugger
            | Rule::k_default
            | Rule::k_do
            | Rule::k_else
            | Rule::k_extends
            | Rule::k_finally
            | Rule::k_for
            | Rule::k_function
            | Rule::k_if
            | Rule::k_import
            | Rule::k_new
            | Rule::k_return
            | Rule::k_switch
            | Rule::k_throw
            | Rule::k_try
            | Rule::k_while
            | Rule::k_yield
            | Rule::k_await
            | Rule::return_with_arg
            | Rule::break_with_label
            | Rule::continue_with_label
    )
}

fn children(pair: RulePair<'_>) -> impl Iterator<Item = RulePair<'_>> {
    pair.into_inner().filter(|p| !is_keyword_token(p.as_rule()))
}

/* ===================== AST Builder ===================== */

struct Builder<'s> {
    source: &'s str,
    lines: LineIndex,
    pratt: PrattParser<Rule>,
}

/// Binary operators from lowest to highest precedence
fn binary_operators() -> PrattParser<Rule> {
    PrattParser::new()
        .op(Op::infix(Rule::op_nullish, Assoc::Left))
        .op(Op::infix(Rule::op_or, Assoc::Left))
        .op(Op::infix(Rule::op_and, Assoc::Left))
        .op(Op::infix(Rule::op_bit_or, Assoc::Left))
        .op(Op::infix(Rule::op_bit_xor, Assoc::Left))
        .op(Op::infix(Rule::op_bit_and, Assoc::Left))
        .op(Op::infix(Rule::op_equality, Assoc::Left))
        .op(Op::infix(Rule::op_relational, Assoc::Left))
        .op(Op::infix(Rule::op_shift, Assoc::Left))
        .op(Op::infix(Rule::op_additive, Assoc::Left))
        .op(Op::infix(Rule::op_multiplicative, Assoc::Left))
        .op(Op::infix(Rule::op_exp, Assoc::Right))
}

impl<'s> Builder<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            lines: LineIndex::new(source),
            pratt: binary_operators(),
        }
    }

    /// Convert a PEST pair's span to our Span type
    fn span(&self, pair: &RulePair<'_>) -> Span {
        let pest_span = pair.as_span();
        let start = pest_span.start();
        // Implicit whitespace before a trailing optional part is still counted
        let end = start + pest_span.as_str().trim_end().len();

        let (start_line, start_col) = self.lines.offset_to_line_col(self.source, start);
        let (end_line, end_col) = self.lines.offset_to_line_col(self.source, end);

        Span::new(start, end, start_line, start_col, end_line, end_col)
    }

    fn unexpected(&self, pair: &RulePair<'_>, context: &str) -> ParseError {
        ParseError::BuildError(
            format!("Unexpected {:?} in {}", pair.as_rule(), context),
            Some(self.span(pair)),
        )
    }

    /// Turn leading string-literal statements into directives
    fn mark_directives(&self, body: &mut [Stmt]) {
        for stmt in body.iter_mut() {
            let raw = match &stmt.kind {
                StmtKind::Expr { expr } => match &expr.kind {
                    ExprKind::Str { raw: Some(raw), .. }
                        if self.source[stmt.span.start..].starts_with(raw.as_str()) =>
                    {
                        raw.clone()
                    }
                    _ => break,
                },
                _ => break,
            };
            stmt.kind = StmtKind::Directive { raw };
        }
    }

    /* ----- Statements ----- */

    fn statements(&self, pair: RulePair<'_>) -> ParseResult<Vec<Stmt>> {
        children(pair).map(|p| self.statement(p)).collect()
    }

    fn statement(&self, pair: RulePair<'_>) -> ParseResult<Stmt> {
        let span = self.span(&pair);
        let kind = match pair.as_rule() {
            Rule::block => StmtKind::Block {
                body: self.statements(pair)?,
            },
            Rule::empty_stmt => StmtKind::Empty,
            Rule::debugger_stmt => StmtKind::Debugger,
            Rule::var_statement => {
                let decl = required(children(pair).next(), "declaration", Some(span))?;
                StmtKind::Var {
                    decl: self.var_decl(decl)?,
                }
            }
            Rule::function_decl => {
                let (_, function) = self.function(pair, FunctionKind::Declaration)?;
                StmtKind::Function {
                    function: Box::new(function),
                }
            }
            Rule::class_decl => StmtKind::Class {
                class: Box::new(self.class(pair)?),
            },
            Rule::if_stmt => self.if_stmt(pair, span)?,
            Rule::for_in_of_stmt => self.for_in_of_stmt(pair, span)?,
            Rule::for_stmt => self.for_stmt(pair)?,
            Rule::while_stmt => {
                let mut inner = children(pair);
                let test = self.expr(required(inner.next(), "loop condition", Some(span))?)?;
                let body = self.statement(required(inner.next(), "loop body", Some(span))?)?;
                StmtKind::While {
                    test,
                    body: Box::new(body),
                }
            }
            Rule::do_while_stmt => {
                let mut inner = children(pair);
                let body = self.statement(required(inner.next(), "loop body", Some(span))?)?;
                let test = self.expr(required(inner.next(), "loop condition", Some(span))?)?;
                StmtKind::DoWhile {
                    body: Box::new(body),
                    test,
                }
            }
            Rule::return_stmt => StmtKind::Return {
                value: children(pair).next().map(|p| self.expr(p)).transpose()?,
            },
            Rule::break_stmt => StmtKind::Break {
                label: children(pair).next().map(|p| p.as_str().to_string()),
            },
            Rule::continue_stmt => StmtKind::Continue {
                label: children(pair).next().map(|p| p.as_str().to_string()),
            },
            Rule::throw_stmt => StmtKind::Throw {
                value: self.expr(required(children(pair).next(), "thrown value", Some(span))?)?,
            },
            Rule::try_stmt => self.try_stmt(pair, span)?,
            Rule::switch_stmt => self.switch_stmt(pair, span)?,
            Rule::labeled_stmt => {
                let mut inner = children(pair);
                let label = required(inner.next(), "label", Some(span))?.as_str().to_string();
                let body = self.statement(required(inner.next(), "labeled body", Some(span))?)?;
                StmtKind::Labeled {
                    label,
                    body: Box::new(body),
                }
            }
            Rule::expr_stmt => StmtKind::Expr {
                expr: self.expr(required(children(pair).next(), "expression", Some(span))?)?,
            },
            _ => return Err(self.unexpected(&pair, "statement position")),
        };
        Ok(Stmt::new(kind, span))
    }

    fn if_stmt(&self, pair: RulePair<'_>, span: Span) -> ParseResult<StmtKind> {
        let mut inner = children(pair);
        let test = self.expr(required(inner.next(), "if condition", Some(span))?)?;
        let consequent = self.statement(required(inner.next(), "if body", Some(span))?)?;
        let alternate = match inner.next() {
            Some(else_clause) => {
                let else_inner = required(children(else_clause).next(), "else body", Some(span))?;
                Some(Box::new(self.statement(else_inner)?))
            }
            None => None,
        };
        Ok(StmtKind::If {
            test,
            consequent: Box::new(consequent),
            alternate,
        })
    }

    fn for_in_of_stmt(&self, pair: RulePair<'_>, span: Span) -> ParseResult<StmtKind> {
        let is_await = pair
            .clone()
            .into_inner()
            .any(|p| p.as_rule() == Rule::k_await);
        let mut inner = children(pair);

        let head_pair = required(inner.next(), "loop head", Some(span))?;
        let left = self.for_head(head_pair)?;
        let kind = required(inner.next(), "'of' or 'in'", Some(span))?;
        let right = self.expr(required(inner.next(), "loop subject", Some(span))?)?;
        let body = Box::new(self.statement(required(inner.next(), "loop body", Some(span))?)?);

        match kind.as_str() {
            "of" => Ok(StmtKind::ForOf {
                left,
                right,
                body,
                is_await,
            }),
            "in" if !is_await => Ok(StmtKind::ForIn { left, right, body }),
            _ => Err(ParseError::BuildError(
                format!("Unexpected loop kind '{}'", kind.as_str()),
                Some(span),
            )),
        }
    }

    fn for_head(&self, pair: RulePair<'_>) -> ParseResult<ForHead> {
        let span = self.span(&pair);
        let head = required(children(pair).next(), "loop binding", Some(span))?;
        match head.as_rule() {
            Rule::for_decl_head => {
                let head_span = self.span(&head);
                let mut inner = children(head);
                let kind = self.var_kind(required(inner.next(), "declaration kind", Some(span))?)?;
                let target = self.binding(required(inner.next(), "binding", Some(span))?)?;
                Ok(ForHead::Var {
                    decl: VarDecl {
                        kind,
                        declarations: vec![VarDeclarator {
                            span: head_span,
                            target,
                            init: None,
                        }],
                    },
                })
            }
            _ => Ok(ForHead::Pattern {
                pattern: expr_to_pattern(self.expr(head)?)?,
            }),
        }
    }

    fn for_stmt(&self, pair: RulePair<'_>) -> ParseResult<StmtKind> {
        let mut init = None;
        let mut test = None;
        let mut update = None;
        let mut body = None;
        for part in children(pair) {
            match part.as_rule() {
                Rule::for_init => {
                    let span = self.span(&part);
                    let inner = required(children(part).next(), "loop initializer", Some(span))?;
                    init = Some(match inner.as_rule() {
                        Rule::var_decl => ForInit::Var {
                            decl: self.var_decl(inner)?,
                        },
                        _ => ForInit::Expr {
                            expr: self.expr(inner)?,
                        },
                    });
                }
                Rule::for_test => test = self.first_expr(part)?,
                Rule::for_update => update = self.first_expr(part)?,
                _ => body = Some(Box::new(self.statement(part)?)),
            }
        }
        Ok(StmtKind::For {
            init,
            test,
            update,
            body: required(body, "loop body", None)?,
        })
    }

    fn first_expr(&self, pair: RulePair<'_>) -> ParseResult<Option<Expr>> {
        children(pair).next().map(|p| self.expr(p)).transpose()
    }

    fn try_stmt(&self, pair: RulePair<'_>, span: Span) -> ParseResult<StmtKind> {
        let mut block = None;
        let mut handler = None;
        let mut finalizer = None;
        for part in children(pair) {
            match part.as_rule() {
                Rule::block => block = Some(self.statements(part)?),
                Rule::catch_clause => {
                    let clause_span = self.span(&part);
                    let mut param = None;
                    let mut body = Vec::new();
                    for item in children(part) {
                        match item.as_rule() {
                            Rule::block => body = self.statements(item)?,
                            _ => param = Some(self.binding(item)?),
                        }
                    }
                    let mut clause = CatchClause::new(param, body);
                    clause.span = clause_span;
                    handler = Some(clause);
                }
                Rule::finally_clause => {
                    let block_pair = required(children(part).next(), "finally block", Some(span))?;
                    finalizer = Some(self.statements(block_pair)?);
                }
                _ => return Err(self.unexpected(&part, "try statement")),
            }
        }
        if handler.is_none() && finalizer.is_none() {
            return Err(ParseError::BuildError(
                "Missing catch or finally after try".to_string(),
                Some(span),
            ));
        }
        Ok(StmtKind::Try {
            block: required(block, "try block", Some(span))?,
            handler,
            finalizer,
        })
    }

    fn switch_stmt(&self, pair: RulePair<'_>, span: Span) -> ParseResult<StmtKind> {
        let mut inner = children(pair);
        let discriminant = self.expr(required(inner.next(), "switch subject", Some(span))?)?;
        let mut cases = Vec::new();
        for case_pair in inner {
            let case_span = self.span(&case_pair);
            let mut test = None;
            let mut body = Vec::new();
            for item in children(case_pair) {
                match item.as_rule() {
                    Rule::case_test => test = self.first_expr(item)?,
                    _ => body.push(self.statement(item)?),
                }
            }
            cases.push(SwitchCase {
                span: case_span,
                test,
                body,
            });
        }
        Ok(StmtKind::Switch {
            discriminant,
            cases,
        })
    }

    fn var_kind(&self, pair: RulePair<'_>) -> ParseResult<VarKind> {
        match pair.as_str() {
            "var" => Ok(VarKind::Var),
            "let" => Ok(VarKind::Let),
            "const" => Ok(VarKind::Const),
            other => Err(ParseError::BuildError(
                format!("Expected 'var', 'let' or 'const', got: {}", other),
                Some(self.span(&pair)),
            )),
        }
    }

    fn var_decl(&self, pair: RulePair<'_>) -> ParseResult<VarDecl> {
        let span = self.span(&pair);
        let mut inner = children(pair);
        let kind = self.var_kind(required(inner.next(), "declaration kind", Some(span))?)?;

        let mut declarations = Vec::new();
        for declarator in inner {
            let decl_span = self.span(&declarator);
            let mut parts = children(declarator);
            let target = self.binding(required(parts.next(), "binding", Some(decl_span))?)?;
            let init = parts.next().map(|p| self.expr(p)).transpose()?;
            if init.is_none() && !matches!(target.kind, PatternKind::Ident { .. }) {
                return Err(ParseError::BuildError(
                    "Destructuring declaration requires an initializer".to_string(),
                    Some(decl_span),
                ));
            }
            declarations.push(VarDeclarator {
                span: decl_span,
                target,
                init,
            });
        }
        Ok(VarDecl { kind, declarations })
    }

    /* ----- Binding Patterns ----- */

    fn binding(&self, pair: RulePair<'_>) -> ParseResult<Pattern> {
        let span = self.span(&pair);
        let kind = match pair.as_rule() {
            Rule::binding_ident => PatternKind::Ident {
                name: pair.as_str().trim().to_string(),
            },
            Rule::binding_element => {
                let mut inner = children(pair);
                let target = self.binding(required(inner.next(), "binding", Some(span))?)?;
                match inner.next() {
                    Some(default) => PatternKind::Default {
                        target: Box::new(target),
                        default: Box::new(self.expr(default)?),
                    },
                    None => return Ok(target),
                }
            }
            Rule::object_binding => {
                let mut props = Vec::new();
                let mut rest = None;
                for prop in children(pair) {
                    let prop_span = self.span(&prop);
                    match prop.as_rule() {
                        Rule::binding_rest => rest = Some(Box::new(self.rest_target(prop)?)),
                        Rule::binding_prop_keyed => {
                            let mut inner = children(prop);
                            let key = self.prop_key(required(inner.next(), "key", Some(prop_span))?)?;
                            let value = self.binding(required(inner.next(), "binding", Some(prop_span))?)?;
                            props.push(ObjectPatternProp {
                                key,
                                value,
                                shorthand: false,
                            });
                        }
                        Rule::binding_prop_short => {
                            let mut inner = children(prop);
                            let ident = required(inner.next(), "binding", Some(prop_span))?;
                            let name = ident.as_str().to_string();
                            let target = Pattern::new(
                                PatternKind::Ident { name: name.clone() },
                                self.span(&ident),
                            );
                            let value = match inner.next() {
                                Some(default) => Pattern::new(
                                    PatternKind::Default {
                                        target: Box::new(target),
                                        default: Box::new(self.expr(default)?),
                                    },
                                    prop_span,
                                ),
                                None => target,
                            };
                            props.push(ObjectPatternProp {
                                key: PropKey::Ident { name },
                                value,
                                shorthand: true,
                            });
                        }
                        _ => return Err(self.unexpected(&prop, "object pattern")),
                    }
                }
                PatternKind::Object { props, rest }
            }
            Rule::array_binding => {
                let mut elements = Vec::new();
                let mut rest = None;
                let mut pending = None;
                for item in children(pair) {
                    if rest.is_some() {
                        return Err(ParseError::BuildError(
                            "Rest element must be last element".to_string(),
                            Some(self.span(&item)),
                        ));
                    }
                    match item.as_rule() {
                        Rule::list_comma => elements.push(pending.take()),
                        Rule::binding_rest => rest = Some(Box::new(self.rest_target(item)?)),
                        _ => pending = Some(self.binding(item)?),
                    }
                }
                if let Some(last) = pending {
                    elements.push(Some(last));
                }
                PatternKind::Array { elements, rest }
            }
            _ => return Err(self.unexpected(&pair, "binding pattern")),
        };
        Ok(Pattern::new(kind, span))
    }

    fn rest_target(&self, pair: RulePair<'_>) -> ParseResult<Pattern> {
        let span = self.span(&pair);
        self.binding(required(children(pair).next(), "rest binding", Some(span))?)
    }

    /* ----- Functions & Classes ----- */

    /// Build any function-shaped rule, returning the property key for methods
    fn function(
        &self,
        pair: RulePair<'_>,
        kind: FunctionKind,
    ) -> ParseResult<(Option<PropKey>, Function)> {
        let span = self.span(&pair);
        let mut key = None;
        let mut function = Function {
            id: crate::ast::NodeId::fresh(),
            span,
            name: None,
            kind,
            is_async: false,
            is_generator: false,
            params: Vec::new(),
            rest: None,
            body: FunctionBody::Block { body: Vec::new() },
        };

        for part in children(pair) {
            match part.as_rule() {
                Rule::kw_async => function.is_async = true,
                Rule::gen_star => function.is_generator = true,
                Rule::kw_get | Rule::kw_set => {}
                Rule::identifier => function.name = Some(part.as_str().to_string()),
                Rule::prop_key => key = Some(self.prop_key(part)?),
                Rule::formal_params => self.formal_params(part, &mut function)?,
                Rule::arrow_params => {
                    let span = self.span(&part);
                    let params = required(children(part).next(), "parameters", Some(span))?;
                    match params.as_rule() {
                        Rule::formal_params => self.formal_params(params, &mut function)?,
                        _ => function.params.push(self.binding(params)?),
                    }
                }
                Rule::rest_param => function.rest = Some(Box::new(self.rest_target(part)?)),
                Rule::binding_element | Rule::binding_ident => {
                    function.params.push(self.binding(part)?)
                }
                Rule::function_body => {
                    let mut body = self.statements(part)?;
                    self.mark_directives(&mut body);
                    function.body = FunctionBody::Block { body };
                }
                Rule::assign_expr => {
                    function.body = FunctionBody::Expr {
                        expr: Box::new(self.expr(part)?),
                    }
                }
                _ => return Err(self.unexpected(&part, "function")),
            }
        }
        Ok((key, function))
    }

    fn formal_params(&self, pair: RulePair<'_>, function: &mut Function) -> ParseResult<()> {
        for param in children(pair) {
            match param.as_rule() {
                Rule::rest_param => function.rest = Some(Box::new(self.rest_target(param)?)),
                _ => function.params.push(self.binding(param)?),
            }
        }
        Ok(())
    }

    /// Build a method-shaped rule (getter, setter, plain/async/generator method)
    fn method(&self, pair: RulePair<'_>, is_static: bool) -> ParseResult<(PropKey, Function)> {
        let span = self.span(&pair);
        let rule = pair.as_rule();
        let kind = match rule {
            Rule::getter => FunctionKind::Getter,
            Rule::setter => FunctionKind::Setter,
            Rule::async_method | Rule::generator_method | Rule::plain_method => {
                FunctionKind::Method
            }
            _ => return Err(self.unexpected(&pair, "method definition")),
        };
        let (key, mut function) = self.function(pair, kind)?;
        let key = required(key, "method name", Some(span))?;
        if rule == Rule::plain_method
            && !is_static
            && matches!(&key, PropKey::Ident { name } if name == "constructor")
        {
            function.kind = FunctionKind::Constructor;
        }
        Ok((key, function))
    }

    fn class(&self, pair: RulePair<'_>) -> ParseResult<Class> {
        let span = self.span(&pair);
        let mut class = Class {
            id: crate::ast::NodeId::fresh(),
            span,
            name: None,
            super_class: None,
            members: Vec::new(),
        };
        for part in children(pair) {
            match part.as_rule() {
                Rule::identifier => class.name = Some(part.as_str().to_string()),
                Rule::class_heritage => {
                    let heritage_span = self.span(&part);
                    let parent = required(children(part).next(), "superclass", Some(heritage_span))?;
                    class.super_class = Some(Box::new(self.expr(parent)?));
                }
                Rule::class_body => {
                    for member in children(part) {
                        class.members.push(self.class_member(member)?);
                    }
                }
                _ => return Err(self.unexpected(&part, "class")),
            }
        }
        Ok(class)
    }

    fn class_member(&self, pair: RulePair<'_>) -> ParseResult<ClassMember> {
        let span = self.span(&pair);
        let mut is_static = false;
        let mut method = None;
        for part in children(pair) {
            match part.as_rule() {
                Rule::kw_static => is_static = true,
                Rule::class_field => {
                    return Err(ParseError::BuildError(
                        "Class fields are not supported".to_string(),
                        Some(self.span(&part)),
                    ))
                }
                _ => method = Some(part),
            }
        }
        let (key, function) = self.method(required(method, "class member", Some(span))?, is_static)?;
        Ok(ClassMember {
            span,
            key,
            is_static,
            function,
        })
    }

    fn prop_key(&self, pair: RulePair<'_>) -> ParseResult<PropKey> {
        let span = self.span(&pair);
        let inner = required(children(pair).next(), "property key", Some(span))?;
        Ok(match inner.as_rule() {
            Rule::computed_key => {
                let key_span = self.span(&inner);
                let expr = required(children(inner).next(), "computed key", Some(key_span))?;
                PropKey::Computed {
                    expr: Box::new(self.expr(expr)?),
                }
            }
            Rule::string_lit => PropKey::Str {
                value: unescape_string(strip_quotes(inner.as_str())),
                raw: Some(inner.as_str().to_string()),
            },
            Rule::numeric_lit => PropKey::Num {
                raw: inner.as_str().to_string(),
            },
            _ => PropKey::Ident {
                name: inner.as_str().to_string(),
            },
        })
    }

    /* ----- Expressions ----- */

    fn expr(&self, pair: RulePair<'_>) -> ParseResult<Expr> {
        let span = self.span(&pair);
        let kind = match pair.as_rule() {
            Rule::expression => {
                let mut exprs = children(pair)
                    .map(|p| self.expr(p))
                    .collect::<ParseResult<Vec<_>>>()?;
                if exprs.len() == 1 {
                    return required(exprs.pop(), "expression", Some(span));
                }
                ExprKind::Sequence { exprs }
            }
            Rule::assign_expr => return self.assign_expr(pair),
            Rule::arrow_function => {
                let (_, function) = self.function(pair, FunctionKind::Arrow)?;
                ExprKind::Function {
                    function: Box::new(function),
                }
            }
            Rule::function_expr => {
                let (_, function) = self.function(pair, FunctionKind::Expression)?;
                ExprKind::Function {
                    function: Box::new(function),
                }
            }
            Rule::class_expr => ExprKind::Class {
                class: Box::new(self.class(pair)?),
            },
            Rule::yield_expr => {
                let mut delegate = false;
                let mut arg = None;
                for part in children(pair) {
                    match part.as_rule() {
                        Rule::gen_star => delegate = true,
                        _ => arg = Some(Box::new(self.expr(part)?)),
                    }
                }
                ExprKind::Yield { arg, delegate }
            }
            Rule::conditional => {
                let mut inner = children(pair);
                let test = self.expr(required(inner.next(), "condition", Some(span))?)?;
                match inner.next() {
                    Some(consequent) => {
                        let alternate = required(inner.next(), "alternate", Some(span))?;
                        ExprKind::Conditional {
                            test: Box::new(test),
                            consequent: Box::new(self.expr(consequent)?),
                            alternate: Box::new(self.expr(alternate)?),
                        }
                    }
                    None => return Ok(test),
                }
            }
            Rule::binary_expr => return self.binary_expr(pair),
            Rule::unary => {
                let mut inner = children(pair);
                let first = required(inner.next(), "operand", Some(span))?;
                if first.as_rule() != Rule::unary_op {
                    return self.expr(first);
                }
                let op = match first.as_str() {
                    "-" => UnaryOp::Minus,
                    "+" => UnaryOp::Plus,
                    "!" => UnaryOp::Not,
                    "~" => UnaryOp::BitNot,
                    "typeof" => UnaryOp::Typeof,
                    "void" => UnaryOp::Void,
                    "delete" => UnaryOp::Delete,
                    other => {
                        return Err(ParseError::BuildError(
                            format!("Unknown unary operator: {}", other),
                            Some(span),
                        ))
                    }
                };
                let arg = self.expr(required(inner.next(), "operand", Some(span))?)?;
                ExprKind::Unary {
                    op,
                    arg: Box::new(arg),
                }
            }
            Rule::await_expr => ExprKind::Await {
                arg: Box::new(self.expr(required(children(pair).next(), "operand", Some(span))?)?),
            },
            Rule::update_expr => {
                let mut inner = children(pair);
                let first = required(inner.next(), "operand", Some(span))?;
                if first.as_rule() == Rule::update_op {
                    let arg = self.expr(required(inner.next(), "operand", Some(span))?)?;
                    ExprKind::Update {
                        op: update_op(first.as_str()),
                        prefix: true,
                        arg: Box::new(arg),
                    }
                } else {
                    let arg = self.expr(first)?;
                    match inner.next() {
                        Some(op) => ExprKind::Update {
                            op: update_op(op.as_str()),
                            prefix: false,
                            arg: Box::new(arg),
                        },
                        None => return Ok(arg),
                    }
                }
            }
            Rule::lhs_expr | Rule::new_callee => return self.build_member_chain(pair),
            Rule::new_expr => {
                let mut inner = children(pair);
                let callee = self.expr(required(inner.next(), "constructor", Some(span))?)?;
                let args = match inner.next() {
                    Some(args) => self.arguments(args)?,
                    None => Vec::new(),
                };
                ExprKind::New {
                    callee: Box::new(callee),
                    args,
                }
            }
            Rule::import_call => ExprKind::Import {
                arg: Box::new(self.expr(required(children(pair).next(), "module", Some(span))?)?),
            },
            Rule::paren_expr => {
                return self.expr(required(children(pair).next(), "expression", Some(span))?)
            }
            Rule::this_expr => ExprKind::This,
            Rule::super_expr => ExprKind::Super,
            Rule::null_lit => ExprKind::Null,
            Rule::bool_lit => ExprKind::Bool {
                value: pair.as_str() == "true",
            },
            Rule::numeric_lit => ExprKind::Num {
                raw: pair.as_str().to_string(),
            },
            Rule::bigint_lit => ExprKind::BigInt {
                raw: pair.as_str().to_string(),
            },
            Rule::string_lit => ExprKind::Str {
                value: unescape_string(strip_quotes(pair.as_str())),
                raw: Some(pair.as_str().to_string()),
            },
            Rule::template_lit => ExprKind::Template {
                tpl: self.template(pair)?,
            },
            Rule::regex_lit => {
                let mut pattern = String::new();
                let mut flags = String::new();
                for part in pair.into_inner() {
                    match part.as_rule() {
                        Rule::regex_body => pattern = part.as_str().to_string(),
                        Rule::regex_flags => flags = part.as_str().to_string(),
                        _ => {}
                    }
                }
                ExprKind::Regex { pattern, flags }
            }
            Rule::array_lit => {
                let mut elements = Vec::new();
                let mut pending = None;
                for item in children(pair) {
                    match item.as_rule() {
                        Rule::list_comma => elements.push(pending.take()),
                        _ => pending = Some(self.array_item(item)?),
                    }
                }
                // A trailing comma adds no hole
                if let Some(last) = pending {
                    elements.push(Some(last));
                }
                ExprKind::Array { elements }
            }
            Rule::object_lit => {
                let props = children(pair)
                    .map(|p| self.object_prop(p))
                    .collect::<ParseResult<Vec<_>>>()?;
                ExprKind::Object { props }
            }
            Rule::identifier_ref | Rule::identifier => ExprKind::Ident {
                name: pair.as_str().trim().to_string(),
            },
            _ => return Err(self.unexpected(&pair, "expression")),
        };
        Ok(Expr::new(kind, span))
    }

    fn assign_expr(&self, pair: RulePair<'_>) -> ParseResult<Expr> {
        let span = self.span(&pair);
        let mut inner = children(pair);
        let first = required(inner.next(), "expression", Some(span))?;
        let left = self.expr(first)?;
        let op_pair = match inner.next() {
            Some(op) => op,
            None => return Ok(left),
        };
        let op = AssignOp::from_token(op_pair.as_str()).ok_or_else(|| {
            ParseError::BuildError(
                format!("Unknown assignment operator: {}", op_pair.as_str()),
                Some(self.span(&op_pair)),
            )
        })?;
        let value = self.expr(required(inner.next(), "assigned value", Some(span))?)?;

        let target = if op == AssignOp::Assign {
            expr_to_pattern(left)?
        } else {
            match left.kind {
                ExprKind::Ident { .. } | ExprKind::Member { optional: false, .. } => {
                    expr_to_pattern(left)?
                }
                _ => {
                    return Err(ParseError::BuildError(
                        "Invalid left-hand side in assignment".to_string(),
                        Some(left.span),
                    ))
                }
            }
        };

        Ok(Expr::new(
            ExprKind::Assign {
                op,
                target: Box::new(target),
                value: Box::new(value),
            },
            span,
        ))
    }

    /// Resolve a flat `operand (op operand)*` sequence by operator precedence
    fn binary_expr(&self, pair: RulePair<'_>) -> ParseResult<Expr> {
        self.pratt
            .map_primary(|operand| -> ParseResult<(Span, Expr)> {
                let span = self.span(&operand);
                Ok((span, self.expr(operand)?))
            })
            .map_infix(|left, op, right| {
                let ((left_span, left), (right_span, right)) = (left?, right?);
                let span = left_span.merge(&right_span);
                let (left, right) = (Box::new(left), Box::new(right));
                let kind = match op.as_rule() {
                    Rule::op_nullish => ExprKind::Logical {
                        op: LogicalOp::Nullish,
                        left,
                        right,
                    },
                    Rule::op_or => ExprKind::Logical {
                        op: LogicalOp::Or,
                        left,
                        right,
                    },
                    Rule::op_and => ExprKind::Logical {
                        op: LogicalOp::And,
                        left,
                        right,
                    },
                    _ => ExprKind::Binary {
                        op: BinaryOp::from_token(op.as_str())
                            .ok_or_else(|| self.unexpected(&op, "binary expression"))?,
                        left,
                        right,
                    },
                };
                Ok((span, Expr::new(kind, span)))
            })
            .parse(children(pair))
            .map(|(_, expr)| expr)
    }

    /// Fold call, member and tagged-template suffixes onto a head expression
    fn build_member_chain(&self, pair: RulePair<'_>) -> ParseResult<Expr> {
        let span = self.span(&pair);
        let mut inner = children(pair);
        let head = required(inner.next(), "expression", Some(span))?;
        let mut acc_span = self.span(&head);
        let mut acc = self.expr(head)?;

        for suffix in inner {
            acc_span = acc_span.merge(&self.span(&suffix));
            let object = Box::new(acc);
            let kind = match suffix.as_rule() {
                Rule::arguments => ExprKind::Call {
                    callee: object,
                    args: self.arguments(suffix)?,
                    optional: false,
                },
                Rule::opt_call => {
                    let suffix_span = self.span(&suffix);
                    let args = required(children(suffix).next(), "arguments", Some(suffix_span))?;
                    ExprKind::Call {
                        callee: object,
                        args: self.arguments(args)?,
                        optional: true,
                    }
                }
                Rule::member_dot | Rule::opt_dot => {
                    let optional = suffix.as_rule() == Rule::opt_dot;
                    let suffix_span = self.span(&suffix);
                    let name = required(children(suffix).next(), "property name", Some(suffix_span))?;
                    ExprKind::Member {
                        object,
                        property: MemberProp::Ident {
                            name: name.as_str().to_string(),
                        },
                        optional,
                    }
                }
                Rule::member_index | Rule::opt_index => {
                    let optional = suffix.as_rule() == Rule::opt_index;
                    let suffix_span = self.span(&suffix);
                    let index = required(children(suffix).next(), "index", Some(suffix_span))?;
                    ExprKind::Member {
                        object,
                        property: MemberProp::Computed {
                            expr: Box::new(self.expr(index)?),
                        },
                        optional,
                    }
                }
                Rule::template_lit => ExprKind::TaggedTemplate {
                    tag: object,
                    tpl: self.template(suffix)?,
                },
                _ => return Err(self.unexpected(&suffix, "member expression")),
            };
            acc = Expr::new(kind, acc_span);
        }
        Ok(acc)
    }

    fn arguments(&self, pair: RulePair<'_>) -> ParseResult<Vec<ExprOrSpread>> {
        children(pair).map(|p| self.array_item(p)).collect()
    }

    fn array_item(&self, pair: RulePair<'_>) -> ParseResult<ExprOrSpread> {
        let span = self.span(&pair);
        match pair.as_rule() {
            Rule::spread_arg => Ok(ExprOrSpread {
                spread: true,
                expr: self.expr(required(children(pair).next(), "spread operand", Some(span))?)?,
            }),
            _ => Ok(ExprOrSpread::plain(self.expr(pair)?)),
        }
    }

    fn object_prop(&self, pair: RulePair<'_>) -> ParseResult<Prop> {
        let span = self.span(&pair);
        match pair.as_rule() {
            Rule::spread_prop => Ok(Prop::Spread {
                expr: self.expr(required(children(pair).next(), "spread operand", Some(span))?)?,
            }),
            Rule::keyed_prop => {
                let mut inner = children(pair);
                let key = self.prop_key(required(inner.next(), "key", Some(span))?)?;
                let value = self.expr(required(inner.next(), "value", Some(span))?)?;
                Ok(Prop::KeyValue {
                    key,
                    value,
                    shorthand: false,
                })
            }
            Rule::shorthand_prop => {
                let ident = required(children(pair).next(), "identifier", Some(span))?;
                let name = ident.as_str().to_string();
                Ok(Prop::KeyValue {
                    key: PropKey::Ident { name: name.clone() },
                    value: Expr::new(ExprKind::Ident { name }, span),
                    shorthand: true,
                })
            }
            _ => {
                let (key, function) = self.method(pair, false)?;
                Ok(Prop::Method {
                    key,
                    function: Box::new(function),
                })
            }
        }
    }

    fn template(&self, pair: RulePair<'_>) -> ParseResult<TemplateLit> {
        let span = self.span(&pair);
        let mut quasis = vec![String::new()];
        let mut exprs = Vec::new();
        for part in pair.into_inner() {
            match part.as_rule() {
                Rule::template_chars => {
                    if let Some(current) = quasis.last_mut() {
                        current.push_str(part.as_str());
                    }
                }
                Rule::template_subst => {
                    let expr = required(children(part).next(), "substitution", Some(span))?;
                    exprs.push(self.expr(expr)?);
                    quasis.push(String::new());
                }
                _ => return Err(self.unexpected(&part, "template literal")),
            }
        }
        Ok(TemplateLit { quasis, exprs })
    }
}

fn update_op(token: &str) -> UpdateOp {
    if token == "--" {
        UpdateOp::Decrement
    } else {
        UpdateOp::Increment
    }
}

/* ===================== Cover Grammar ===================== */

/// Reinterpret an expression as an assignment target
pub fn expr_to_pattern(expr: Expr) -> ParseResult<Pattern> {
    let span = expr.span;
    if matches!(expr.kind, ExprKind::Member { optional: false, .. }) {
        return Ok(Pattern::new(
            PatternKind::Expr {
                expr: Box::new(expr),
            },
            span,
        ));
    }

    let invalid = || {
        ParseError::BuildError(
            "Invalid destructuring assignment target".to_string(),
            Some(span),
        )
    };

    let kind = match expr.kind {
        ExprKind::Ident { name } => PatternKind::Ident { name },
        ExprKind::Array { elements } => {
            let count = elements.len();
            let mut patterns = Vec::new();
            let mut rest = None;
            for (idx, element) in elements.into_iter().enumerate() {
                match element {
                    None => patterns.push(None),
                    Some(ExprOrSpread { spread: true, expr }) if idx + 1 == count => {
                        rest = Some(Box::new(expr_to_pattern(expr)?));
                    }
                    Some(ExprOrSpread { spread: true, .. }) => return Err(invalid()),
                    Some(ExprOrSpread { expr, .. }) => patterns.push(Some(expr_to_pattern(expr)?)),
                }
            }
            PatternKind::Array {
                elements: patterns,
                rest,
            }
        }
        ExprKind::Object { props } => {
            let count = props.len();
            let mut patterns = Vec::new();
            let mut rest = None;
            for (idx, prop) in props.into_iter().enumerate() {
                match prop {
                    Prop::KeyValue {
                        key,
                        value,
                        shorthand,
                    } => patterns.push(ObjectPatternProp {
                        key,
                        value: expr_to_pattern(value)?,
                        shorthand,
                    }),
                    Prop::Spread { expr } if idx + 1 == count => {
                        rest = Some(Box::new(expr_to_pattern(expr)?));
                    }
                    _ => return Err(invalid()),
                }
            }
            PatternKind::Object {
                props: patterns,
                rest,
            }
        }
        ExprKind::Assign {
            op: AssignOp::Assign,
            target,
            value,
        } => PatternKind::Default {
            target,
            default: value,
        },
        _ => return Err(invalid()),
    };
    Ok(Pattern::new(kind, span))
}

/* ===================== String Literals ===================== */

fn strip_quotes(raw: &str) -> &str {
    if raw.len() >= 2 {
        &raw[1..raw.len() - 1]
    } else {
        raw
    }
}

/// Decode the escape sequences of a string literal body
pub fn unescape_string(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    let mut pending_high: Option<u32> = None;

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            flush_surrogate(&mut out, &mut pending_high);
            out.push(ch);
            continue;
        }
        let Some(esc) = chars.next() else {
            break;
        };
        let unit = match esc {
            'n' => Some('\n' as u32),
            'r' => Some('\r' as u32),
            't' => Some('\t' as u32),
            'b' => Some(0x08),
            'f' => Some(0x0c),
            'v' => Some(0x0b),
            '0' if !chars.peek().is_some_and(|c| c.is_ascii_digit()) => Some(0),
            'x' => read_hex(&mut chars, 2),
            'u' => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    let mut digits = String::new();
                    for c in chars.by_ref() {
                        if c == '}' {
                            break;
                        }
                        digits.push(c);
                    }
                    u32::from_str_radix(&digits, 16).ok()
                } else {
                    read_hex(&mut chars, 4)
                }
            }
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                None
            }
            '\n' | '\u{2028}' | '\u{2029}' => None,
            other => Some(other as u32),
        };
        let Some(unit) = unit else {
            continue;
        };
        if (0xD800..0xDC00).contains(&unit) {
            flush_surrogate(&mut out, &mut pending_high);
            pending_high = Some(unit);
        } else if (0xDC00..0xE000).contains(&unit) {
            match pending_high.take() {
                Some(high) => {
                    let combined = 0x10000 + ((high - 0xD800) << 10) + (unit - 0xDC00);
                    out.push(char::from_u32(combined).unwrap_or('\u{FFFD}'));
                }
                None => out.push('\u{FFFD}'),
            }
        } else {
            flush_surrogate(&mut out, &mut pending_high);
            out.push(char::from_u32(unit).unwrap_or('\u{FFFD}'));
        }
    }
    flush_surrogate(&mut out, &mut pending_high);
    out
}

fn flush_surrogate(out: &mut String, pending: &mut Option<u32>) {
    if pending.take().is_some() {
        out.push('\u{FFFD}');
    }
}

fn read_hex(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, count: usize) -> Option<u32> {
    let mut digits = String::with_capacity(count);
    for _ in 0..count {
        digits.push(chars.next()?);
    }
    u32::from_str_radix(&digits, 16).ok()
}
