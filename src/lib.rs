//! A compiler for Handlebars-style templates that produces a deterministic,
//! inspectable opcode program instead of a direct interpreter.
//!
//! # Overview
//!
//! `stencil` sits in the middle of a template pipeline. An external parser
//! produces an [`ast::Program`], [`compile`] turns it into an
//! [`Environment`], and an external code generator turns the environment
//! into an executable renderer:
//!
//! ```text
//! parser -> ast::Program -> compile(..) -> Environment -> code generator
//! ```
//!
//! The compiler makes three kinds of decisions statically, without any
//! render-time data:
//!
//! - **Scope depth**: how many enclosing scopes each variable reference
//!   needs, folded across arbitrarily nested block bodies.
//! - **Call classification**: whether a call site is a definite helper, an
//!   ambiguous bare name resolved at execution, or a plain value lookup,
//!   driven by the known-helpers table in [`Options`].
//! - **Composition**: nested block and partial bodies are compiled as
//!   independent child environments, referenced by index from the parent.
//!
//! # Getting started
//!
//! Build (or parse) a program and compile it:
//!
//! ```
//! use stencil::{ast, Options};
//!
//! // `Hello {{user.name}}!` as a parser would produce it
//! let program = ast::Program {
//!     stmts: vec![
//!         ast::Stmt::Content("Hello ".to_string()),
//!         ast::Stmt::Mustache(ast::Mustache::new(
//!             ast::Path::new(["user", "name"]).into(),
//!             vec![],
//!             None,
//!         )),
//!         ast::Stmt::Content("!".to_string()),
//!     ],
//! };
//!
//! let env = stencil::compile(&program, &Options::new())?;
//! assert!(env.children.is_empty());
//! println!("{}", env.disassemble());
//! # Ok::<(), stencil::Error>(())
//! ```
//!
//! The disassembly for the program above looks like this:
//!
//! ```text
//! appendContent "Hello "
//! getContext 0
//! lookupOnContext "user"
//! lookup "name"
//! resolvePossibleLambda
//! appendEscaped
//! appendContent "!"
//! ```

pub mod ast;
mod compile;
mod error;
mod fmt;
mod instr;

use std::collections::BTreeMap;

pub use crate::error::{Error, ErrorKind};
pub use crate::instr::{Environment, Literal, Opcode};

/// A type alias for results in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Helper names that are always present in the known-helpers table.
const BUILTIN_HELPERS: &[&str] = &[
    "helperMissing",
    "blockHelperMissing",
    "each",
    "if",
    "unless",
    "with",
    "log",
];

/// Compile-time configuration.
///
/// Options are immutable for the duration of one whole-template compile.
/// The known-helpers table is merged exactly once at the root: built-ins
/// first, then caller entries, so caller entries win on name collision. The
/// merged table is then visible, unchanged, to every nested body compile.
///
/// # Examples
///
/// ```
/// let options = stencil::Options::new()
///     .known_helper("markdown", true)
///     .known_helpers_only(true);
/// ```
#[derive(Debug, Clone)]
pub struct Options {
    pub(crate) known_helpers: BTreeMap<String, bool>,
    pub(crate) known_helpers_only: bool,
    pub(crate) string_params: bool,
    pub(crate) data: bool,
    pub(crate) no_escape: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

impl Options {
    /// Construct the default configuration.
    ///
    /// The private-data channel is enabled by default; use
    /// [`data`][Options::data] to disable it explicitly.
    pub fn new() -> Self {
        Self {
            known_helpers: BTreeMap::new(),
            known_helpers_only: false,
            string_params: false,
            data: true,
            no_escape: false,
        }
    }

    /// Map a helper name in the known-helpers table.
    ///
    /// Mapping a name to `true` guarantees it refers to a helper at render
    /// time, enabling the cheaper `invokeKnownHelper` instruction. Mapping a
    /// built-in to `false` removes that guarantee; merge order is literal
    /// and caller entries win.
    pub fn known_helper(mut self, name: impl Into<String>, known: bool) -> Self {
        self.known_helpers.insert(name.into(), known);
        self
    }

    /// Only accept helper names present in the known-helpers table.
    ///
    /// With this set, an unknown name in helper position fails compilation
    /// with [`ErrorKind::UnknownHelper`], and bare names are never treated
    /// as ambiguous.
    pub fn known_helpers_only(mut self, enabled: bool) -> Self {
        self.known_helpers_only = enabled;
        self
    }

    /// Compile parameters and hash values to their static textual form
    /// instead of lookup instructions (introspection mode).
    pub fn string_params(mut self, enabled: bool) -> Self {
        self.string_params = enabled;
        self
    }

    /// Enable or disable the private-data channel. Enabled by default.
    pub fn data(mut self, enabled: bool) -> Self {
        self.data = enabled;
        self
    }

    /// Disable HTML escaping of appended values globally.
    pub fn no_escape(mut self, enabled: bool) -> Self {
        self.no_escape = enabled;
        self
    }

    /// The root-level merge: built-ins inserted first, caller entries
    /// applied on top.
    pub(crate) fn merged(&self) -> Options {
        let mut known_helpers = BTreeMap::new();
        for name in BUILTIN_HELPERS {
            known_helpers.insert((*name).to_string(), true);
        }
        for (name, known) in &self.known_helpers {
            known_helpers.insert(name.clone(), *known);
        }
        Options {
            known_helpers,
            ..self.clone()
        }
    }

    pub(crate) fn is_known_helper(&self, name: &str) -> bool {
        self.known_helpers.get(name).copied().unwrap_or(false)
    }
}

/// Compile a program into an opcode [`Environment`].
///
/// Each call allocates fresh compiler state and runs to completion or fails
/// with one of the static errors in [`ErrorKind`]; there is no partial
/// output. Compiling the same program with the same options twice yields
/// structurally equal environments (see [`Environment::equals`]).
pub fn compile(program: &ast::Program, options: &Options) -> Result<Environment> {
    let options = options.merged();
    compile::program(program, &options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merged_contains_builtins() {
        let opts = Options::new().merged();
        for name in BUILTIN_HELPERS {
            assert!(opts.is_known_helper(name), "missing builtin {name}");
        }
    }

    #[test]
    fn merged_caller_entries_win() {
        let opts = Options::new()
            .known_helper("each", false)
            .known_helper("markdown", true)
            .merged();
        assert!(!opts.is_known_helper("each"));
        assert!(opts.is_known_helper("markdown"));
        assert!(opts.is_known_helper("if"));
    }

    #[test]
    fn unknown_names_are_not_known() {
        let opts = Options::new().merged();
        assert!(!opts.is_known_helper("markdown"));
    }
}
