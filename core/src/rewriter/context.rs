//! Pipeline state threaded through the rewrite stages
//!
//! Bookkeeping lives in side tables keyed by [`NodeId`], never on the nodes
//! and never by structural equality, so two identical-looking expressions from
//! different places are always told apart.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::ast::{Expr, NodeId, Span, Stmt};
use crate::config::RewriterConfig;

/// Pipeline-private node annotations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Node was produced from template text, not typed by the user
    Generated,
    /// Function, loop or statement already transformed by the maybe-async stage
    Rewritten,
    /// Catch clause already passes its error through the demangler
    Demangled,
}

/// Hands out identifiers that collide with nothing in the input
#[derive(Debug, Default)]
pub struct NameGen {
    taken: HashSet<String>,
}

impl NameGen {
    /// Reserve every identifier-like word of `source`
    ///
    /// Scanning the raw text over-approximates the names in use (it also sees
    /// words inside strings and comments), which is harmless for freshness.
    pub fn for_source(source: &str) -> Self {
        let mut taken = HashSet::new();
        let mut word = String::new();
        for ch in source.chars().chain(std::iter::once(' ')) {
            if ch.is_alphanumeric() || ch == '_' || ch == '$' {
                word.push(ch);
            } else if !word.is_empty() {
                taken.insert(std::mem::take(&mut word));
            }
        }
        Self { taken }
    }

    /// `_base`, then `_base2`, `_base3`, ...
    pub fn fresh(&mut self, base: &str) -> String {
        let stem = format!("_{}", base);
        let mut candidate = stem.clone();
        let mut counter = 1;
        while self.taken.contains(&candidate) {
            counter += 1;
            candidate = format!("{}{}", stem, counter);
        }
        self.taken.insert(candidate.clone());
        candidate
    }

    pub fn is_taken(&self, name: &str) -> bool {
        self.taken.contains(name)
    }
}

/// Names of the runtime helpers declared by one root group's prelude
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelperNames {
    /// Deferred value symbol
    pub sp: String,
    /// Deferred iterable symbol
    pub sai: String,
    /// Shared expression holder
    pub ex: String,
    pub msp: String,
    pub isp: String,
    pub ansp: String,
    pub aaitsi: String,
    pub de: String,
}

/// Helper identifiers for one rewritten function
///
/// The state slots are fresh for every function; the helper functions and
/// expression holder are shared with the nearest enclosing group.
#[derive(Debug, Clone)]
pub struct HelperGroup {
    pub shared: Rc<HelperNames>,
    /// Function state slot
    pub fs: String,
    /// Synchronous return value slot
    pub srv: String,
    /// Asynchronous return value slot
    pub arv: String,
    /// Whether this group declares the helper prelude
    pub is_root: bool,
}

/// Parsed template text, cached per pipeline
#[derive(Debug, Clone)]
pub(crate) enum ParsedTemplate {
    Stmts(Vec<Stmt>),
    Expr(Expr),
}

pub struct PipelineContext<'a> {
    pub config: &'a RewriterConfig,
    source: &'a str,
    markers: HashSet<(NodeId, Marker)>,
    names: NameGen,
    pub(crate) templates: HashMap<String, ParsedTemplate>,
}

impl<'a> PipelineContext<'a> {
    pub fn new(source: &'a str, config: &'a RewriterConfig) -> Self {
        Self {
            config,
            source,
            markers: HashSet::new(),
            names: NameGen::for_source(source),
            templates: HashMap::new(),
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Original source text under `span`, if the node came from the input
    pub fn source_text(&self, span: &Span) -> Option<&'a str> {
        span.text(self.source)
    }

    pub fn mark(&mut self, id: NodeId, marker: Marker) {
        if id != NodeId::DUMMY {
            self.markers.insert((id, marker));
        }
    }

    pub fn is_marked(&self, id: NodeId, marker: Marker) -> bool {
        self.markers.contains(&(id, marker))
    }

    pub fn fresh_name(&mut self, base: &str) -> String {
        self.names.fresh(base)
    }

    /// Group for a function with no enclosing group
    pub fn root_group(&mut self) -> HelperGroup {
        let shared = HelperNames {
            sp: self.fresh_name("syntheticPromise"),
            sai: self.fresh_name("syntheticAsyncIterable"),
            ex: self.fresh_name("ex"),
            msp: self.fresh_name("markSyntheticPromise"),
            isp: self.fresh_name("isSp"),
            ansp: self.fresh_name("assertNotSyntheticPromise"),
            aaitsi: self.fresh_name("adaptAsyncIterableToSyncIterable"),
            de: self.fresh_name("demangleError"),
        };
        self.group(Rc::new(shared), true)
    }

    /// Group for a function nested inside `parent`
    pub fn child_group(&mut self, parent: &HelperGroup) -> HelperGroup {
        self.group(Rc::clone(&parent.shared), false)
    }

    fn group(&mut self, shared: Rc<HelperNames>, is_root: bool) -> HelperGroup {
        HelperGroup {
            shared,
            fs: self.fresh_name("functionState"),
            srv: self.fresh_name("synchronousReturnValue"),
            arv: self.fresh_name("asynchronousReturnValue"),
            is_root,
        }
    }
}
