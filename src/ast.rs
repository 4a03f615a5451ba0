//! AST representing a parsed template.
//!
//! This vocabulary is the input contract of the compiler. It is produced by
//! an external parser and is read-only here; the constructors in this module
//! only encode the tagging conventions that a conformant parser follows.

/// A parsed template body: the root of a template or the body of a block.
#[derive(Debug, Clone)]
pub struct Program {
    pub stmts: Vec<Stmt>,
}

/// A top-level statement in a program.
#[derive(Debug, Clone)]
pub enum Stmt {
    /// Literal template text, emitted verbatim.
    Content(String),
    /// A comment, dropped during compilation.
    Comment(String),
    /// An inline expression like `{{name}}` or `{{helper arg}}`.
    Mustache(Mustache),
    /// A block like `{{#each items}} ... {{/each}}`.
    Block(Block),
    /// A partial invocation like `{{> header}}`.
    Partial(Partial),
}

/// A call site: the driving expression of an inline mustache or a block.
#[derive(Debug, Clone)]
pub struct Mustache {
    pub id: Callee,
    pub params: Vec<Expr>,
    pub hash: Option<Hash>,
    /// False for the raw `{{{ ... }}}` form.
    pub escaped: bool,
    /// Tagged by the parser: explicit helper syntax (arguments present).
    pub is_helper: bool,
    /// Tagged by the parser: a bare single-segment identifier, the only
    /// shape that could plausibly be a helper name.
    pub eligible_helper: bool,
}

/// The subject of a call site.
#[derive(Debug, Clone)]
pub enum Callee {
    Path(Path),
    Data(Data),
}

/// An identifier: ordered path segments plus an ancestor depth.
///
/// `depth` counts enclosing scopes to walk outward before the lookup starts,
/// e.g. `../name` has depth 1. An empty `parts` refers to the selected
/// context itself (`this` or `.`).
#[derive(Debug, Clone)]
pub struct Path {
    pub parts: Vec<String>,
    pub depth: usize,
    /// Explicitly rooted in the current scope, e.g. `./name` or `this.name`.
    pub is_scoped: bool,
    /// The source text, kept for diagnostics and string-params mode.
    pub original: String,
}

/// A private-data reference like `{{@index}}`.
#[derive(Debug, Clone)]
pub struct Data {
    pub path: Path,
}

/// An expression in argument or hash-value position.
#[derive(Debug, Clone)]
pub enum Expr {
    Path(Path),
    Data(Data),
    Str(String),
    Int(i64),
    Bool(bool),
}

/// Named arguments to a call, in declaration order.
#[derive(Debug, Clone)]
pub struct Hash {
    pub pairs: Vec<(String, Expr)>,
}

/// A block statement: a driving mustache plus optional bodies.
#[derive(Debug, Clone)]
pub struct Block {
    pub mustache: Mustache,
    pub program: Option<Program>,
    pub inverse: Option<Program>,
}

/// A partial statement with an optional explicit context.
#[derive(Debug, Clone)]
pub struct Partial {
    pub name: String,
    pub context: Option<Path>,
}

impl Program {
    pub const fn new() -> Self {
        Self { stmts: Vec::new() }
    }
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}

impl Data {
    /// A reference into the private-data channel, e.g. `@index`.
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut path = Path::new(parts);
        path.original = format!("@{}", path.original);
        Self { path }
    }
}

impl Mustache {
    /// Construct a call site, tagging it the way the parser does: explicit
    /// helper syntax is the presence of arguments, and eligibility is a bare
    /// single-segment identifier in call position.
    pub fn new(id: Callee, params: Vec<Expr>, hash: Option<Hash>) -> Self {
        let is_helper = !params.is_empty() || hash.is_some();
        let eligible_helper = match &id {
            Callee::Path(path) => path.is_bare(),
            Callee::Data(_) => false,
        };
        Self {
            id,
            params,
            hash,
            escaped: true,
            is_helper,
            eligible_helper,
        }
    }

    /// Mark this call site as the raw `{{{ ... }}}` form.
    pub fn unescaped(mut self) -> Self {
        self.escaped = false;
        self
    }

    /// The first path segment of the callee, used as the helper name.
    pub fn name(&self) -> Option<&str> {
        match &self.id {
            Callee::Path(path) => path.parts.first().map(String::as_str),
            Callee::Data(_) => None,
        }
    }
}

impl Path {
    /// A depth-0 path from dot-separated segments.
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let parts: Vec<String> = parts.into_iter().map(Into::into).collect();
        let original = parts.join(".");
        Self {
            parts,
            depth: 0,
            is_scoped: false,
            original,
        }
    }

    /// A path that walks `depth` enclosing scopes outward, e.g. `../name`.
    pub fn ancestor<I, S>(parts: I, depth: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut path = Self::new(parts);
        path.original = format!("{}{}", "../".repeat(depth), path.original);
        path.depth = depth;
        path
    }

    /// A path explicitly rooted in the current scope, e.g. `./name`.
    pub fn scoped<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut path = Self::new(parts);
        path.original = format!("./{}", path.original);
        path.is_scoped = true;
        path
    }

    /// Whether this is a bare single-segment identifier, the only shape
    /// that could name a helper.
    pub fn is_bare(&self) -> bool {
        self.parts.len() == 1 && self.depth == 0 && !self.is_scoped
    }
}

impl Expr {
    /// The ancestor depth of the expression; literals are always local.
    pub fn depth(&self) -> usize {
        match self {
            Expr::Path(path) => path.depth,
            Expr::Data(_) | Expr::Str(_) | Expr::Int(_) | Expr::Bool(_) => 0,
        }
    }

    /// The static textual form of the expression, used in string-params mode.
    pub fn string_value(&self) -> String {
        match self {
            Expr::Path(path) => path.original.clone(),
            Expr::Data(data) => data.path.original.clone(),
            Expr::Str(s) => s.clone(),
            Expr::Int(n) => n.to_string(),
            Expr::Bool(b) => b.to_string(),
        }
    }

    /// The node kind, used in string-params mode.
    pub fn kind(&self) -> &'static str {
        match self {
            Expr::Path(_) => "path",
            Expr::Data(_) => "data",
            Expr::Str(_) => "string",
            Expr::Int(_) => "integer",
            Expr::Bool(_) => "boolean",
        }
    }
}

impl From<Path> for Callee {
    fn from(path: Path) -> Self {
        Callee::Path(path)
    }
}

impl From<Data> for Callee {
    fn from(data: Data) -> Self {
        Callee::Data(data)
    }
}

impl From<Path> for Expr {
    fn from(path: Path) -> Self {
        Expr::Path(path)
    }
}

impl From<Data> for Expr {
    fn from(data: Data) -> Self {
        Expr::Data(data)
    }
}
