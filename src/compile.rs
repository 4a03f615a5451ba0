//! Compile a parsed template into an opcode program.
//!
//! The compiler is a synchronous recursive tree-walk over the AST. Each
//! nested block body is compiled by a fresh [`Compiler`] into an independent
//! [`Environment`] whose summary information (referenced ancestor depths,
//! partial and private-data usage) is folded back into the parent.

use std::collections::BTreeSet;

use crate::ast;
use crate::instr::{Environment, Literal, Opcode};
use crate::{Error, Options, Result};

/// Compile a program against already-merged options.
pub(crate) fn program(program: &ast::Program, opts: &Options) -> Result<Environment> {
    Compiler::new(opts).compile(program)
}

/// A single-use builder that constructs an opcode program from an AST.
///
/// Constructed fresh for every program, including every recursive child
/// compile; no state survives across compiles apart from the shared merged
/// options.
struct Compiler<'opts> {
    opts: &'opts Options,
    opcodes: Vec<Opcode>,
    children: Vec<Environment>,
    depths: BTreeSet<usize>,
    use_partial: bool,
    use_data: bool,
}

/// The compile-time classification of a call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    /// Definitely a helper invocation.
    Helper,
    /// A bare name whose helper-vs-value resolution is deferred to execution.
    Ambiguous,
    /// A plain value lookup.
    Simple,
}

impl<'opts> Compiler<'opts> {
    fn new(opts: &'opts Options) -> Self {
        Self {
            opts,
            opcodes: Vec::new(),
            children: Vec::new(),
            depths: BTreeSet::new(),
            use_partial: false,
            use_data: false,
        }
    }

    fn compile(mut self, program: &ast::Program) -> Result<Environment> {
        for stmt in &program.stmts {
            self.compile_stmt(stmt)?;
        }
        Ok(Environment {
            is_simple: program.stmts.len() == 1,
            opcodes: self.opcodes,
            children: self.children,
            // BTreeSet iterates in ascending order
            depths: self.depths.into_iter().collect(),
            use_partial: self.use_partial,
            use_data: self.use_data,
        })
    }

    /// Compile a nested body as an independent child environment and return
    /// its index.
    ///
    /// Every child depth d >= 2 is recorded here as d - 1: one level is
    /// consumed crossing the block boundary, and depths 0 and 1 are local
    /// to the child.
    fn compile_child(&mut self, program: &ast::Program) -> Result<usize> {
        let child = Compiler::new(self.opts).compile(program)?;

        self.use_partial |= child.use_partial;
        self.use_data |= child.use_data;
        for &depth in &child.depths {
            if depth >= 2 {
                self.add_depth(depth - 1);
            }
        }

        let id = self.children.len();
        self.children.push(child);
        Ok(id)
    }

    fn compile_stmt(&mut self, stmt: &ast::Stmt) -> Result<()> {
        match stmt {
            ast::Stmt::Content(content) => {
                self.push(Opcode::AppendContent(content.clone()));
            }
            ast::Stmt::Comment(_) => {}
            ast::Stmt::Mustache(mustache) => {
                self.compile_mustache(mustache)?;
            }
            ast::Stmt::Block(block) => {
                self.compile_block(block)?;
            }
            ast::Stmt::Partial(partial) => {
                self.compile_partial(partial)?;
            }
        }
        Ok(())
    }

    fn compile_mustache(&mut self, mustache: &ast::Mustache) -> Result<()> {
        match self.classify(mustache) {
            Kind::Simple => self.compile_simple(mustache)?,
            Kind::Helper => self.compile_helper(mustache, None, None)?,
            Kind::Ambiguous => self.compile_ambiguous(mustache, None, None),
        }

        if mustache.escaped && !self.opts.no_escape {
            self.push(Opcode::AppendEscaped);
        } else {
            self.push(Opcode::Append);
        }
        Ok(())
    }

    fn compile_block(&mut self, block: &ast::Block) -> Result<()> {
        let program = match &block.program {
            Some(body) => Some(self.compile_child(body)?),
            None => None,
        };
        let inverse = match &block.inverse {
            Some(body) => Some(self.compile_child(body)?),
            None => None,
        };

        match self.classify(&block.mustache) {
            Kind::Helper => {
                self.compile_helper(&block.mustache, program, inverse)?;
            }
            Kind::Simple => {
                // A plain context value in block position must still execute
                // as if it were a block helper, via `blockHelperMissing`.
                self.compile_simple(&block.mustache)?;
                self.push(Opcode::PushProgram(program));
                self.push(Opcode::PushProgram(inverse));
                self.push(Opcode::EmptyHash);
                self.push(Opcode::BlockValue);
            }
            Kind::Ambiguous => {
                self.compile_ambiguous(&block.mustache, program, inverse);
                self.push(Opcode::PushProgram(program));
                self.push(Opcode::PushProgram(inverse));
                self.push(Opcode::EmptyHash);
                self.push(Opcode::AmbiguousBlockValue);
            }
        }

        self.push(Opcode::Append);
        Ok(())
    }

    fn compile_partial(&mut self, partial: &ast::Partial) -> Result<()> {
        self.use_partial = true;

        match &partial.context {
            Some(path) => self.compile_path(path),
            None => {
                self.push(Opcode::GetContext(0));
                self.push(Opcode::PushContext);
            }
        }

        self.push(Opcode::InvokePartial(partial.name.clone()));
        self.push(Opcode::Append);
        Ok(())
    }

    /// Resolve the call site as a plain value lookup.
    fn compile_simple(&mut self, mustache: &ast::Mustache) -> Result<()> {
        match &mustache.id {
            ast::Callee::Path(path) => self.compile_path(path),
            ast::Callee::Data(data) => self.compile_data(data)?,
        }
        self.push(Opcode::ResolvePossibleLambda);
        Ok(())
    }

    /// Stage parameters, body ids, and the hash, then invoke by name.
    fn compile_helper(
        &mut self,
        mustache: &ast::Mustache,
        program: Option<usize>,
        inverse: Option<usize>,
    ) -> Result<()> {
        let argc = mustache.params.len();
        self.push_params(&mustache.params)?;

        self.push(Opcode::PushProgram(program));
        self.push(Opcode::PushProgram(inverse));

        match &mustache.hash {
            Some(hash) => self.compile_hash(hash)?,
            None => self.push(Opcode::EmptyHash),
        }

        let name = match mustache.name() {
            Some(name) => name.to_string(),
            None => panic!("parser bug, helper call without a named subject"),
        };

        if self.opts.is_known_helper(&name) {
            self.push(Opcode::InvokeKnownHelper { argc, name });
        } else if self.opts.known_helpers_only {
            return Err(Error::unknown_helper(&name));
        } else {
            self.push(Opcode::InvokeHelper { argc, name });
        }
        Ok(())
    }

    /// Defer the helper-vs-value decision for a bare name to execution.
    fn compile_ambiguous(
        &mut self,
        mustache: &ast::Mustache,
        program: Option<usize>,
        inverse: Option<usize>,
    ) {
        let name = match mustache.name() {
            Some(name) => name.to_string(),
            None => panic!("parser bug, ambiguous call without a named subject"),
        };
        let is_block = program.is_some() || inverse.is_some();

        // eligible callees are depth 0 by construction
        let depth = match &mustache.id {
            ast::Callee::Path(path) => path.depth,
            ast::Callee::Data(_) => 0,
        };
        self.push(Opcode::GetContext(depth));

        self.push(Opcode::PushProgram(program));
        self.push(Opcode::PushProgram(inverse));

        self.push(Opcode::InvokeAmbiguous { name, is_block });
    }

    fn compile_expr(&mut self, expr: &ast::Expr) -> Result<()> {
        match expr {
            ast::Expr::Path(path) => self.compile_path(path),
            ast::Expr::Data(data) => self.compile_data(data)?,
            ast::Expr::Str(s) => self.push(Opcode::PushString(s.clone())),
            ast::Expr::Int(n) => self.push(Opcode::PushLiteral(Literal::Int(*n))),
            ast::Expr::Bool(b) => self.push(Opcode::PushLiteral(Literal::Bool(*b))),
        }
        Ok(())
    }

    fn compile_path(&mut self, path: &ast::Path) {
        self.add_depth(path.depth);
        self.push(Opcode::GetContext(path.depth));

        match path.parts.split_first() {
            Some((first, rest)) => {
                self.push(Opcode::LookupOnContext(first.clone()));
                for part in rest {
                    self.push(Opcode::Lookup(part.clone()));
                }
            }
            // a zero-segment path (`this`) pushes the selected context
            None => self.push(Opcode::PushContext),
        }
    }

    fn compile_data(&mut self, data: &ast::Data) -> Result<()> {
        self.use_data = true;

        // the private-data channel is limited to the immediate scope
        if data.path.is_scoped || data.path.depth > 0 {
            return Err(Error::scoped_data(&data.path.original));
        }

        self.push(Opcode::LookupData);
        for part in &data.path.parts {
            self.push(Opcode::Lookup(part.clone()));
        }
        Ok(())
    }

    fn compile_hash(&mut self, hash: &ast::Hash) -> Result<()> {
        self.push(Opcode::PushHash);
        for (key, value) in &hash.pairs {
            if self.opts.string_params {
                self.push_string_param(value);
            } else {
                self.compile_expr(value)?;
            }
            self.push(Opcode::AssignToHash(key.clone()));
        }
        self.push(Opcode::PopHash);
        Ok(())
    }

    /// Stage parameters in reverse syntactic order so that the consumer,
    /// popping the stack, receives them in original left-to-right order.
    fn push_params(&mut self, params: &[ast::Expr]) -> Result<()> {
        for param in params.iter().rev() {
            if self.opts.string_params {
                self.push_string_param(param);
            } else {
                self.compile_expr(param)?;
            }
        }
        Ok(())
    }

    /// Stage an expression as its static textual form (string-params mode).
    fn push_string_param(&mut self, expr: &ast::Expr) {
        let depth = expr.depth();
        self.add_depth(depth);
        self.push(Opcode::GetContext(depth));
        self.push(Opcode::PushStringParam {
            value: expr.string_value(),
            kind: expr.kind(),
        });
    }

    /// Classify a call site against the merged known-helpers table.
    ///
    /// A still-eligible bare name is promoted to a definite helper if the
    /// table knows it, and demoted to a plain value under
    /// `known_helpers_only`.
    fn classify(&self, mustache: &ast::Mustache) -> Kind {
        let mut is_helper = mustache.is_helper;
        let mut is_eligible = mustache.eligible_helper;

        if is_eligible && !is_helper {
            match mustache.name() {
                Some(name) if self.opts.is_known_helper(name) => is_helper = true,
                _ if self.opts.known_helpers_only => is_eligible = false,
                _ => {}
            }
        }

        if is_helper {
            Kind::Helper
        } else if is_eligible {
            Kind::Ambiguous
        } else {
            Kind::Simple
        }
    }

    /// Record a referenced ancestor depth; depth 0 is implicit.
    fn add_depth(&mut self, depth: usize) {
        if depth == 0 {
            return;
        }
        self.depths.insert(depth);
    }

    fn push(&mut self, opcode: Opcode) {
        self.opcodes.push(opcode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare(name: &str) -> ast::Mustache {
        ast::Mustache::new(ast::Path::new([name]).into(), vec![], None)
    }

    #[test]
    fn classify_bare_name_is_ambiguous() {
        let opts = Options::new().merged();
        let compiler = Compiler::new(&opts);
        assert_eq!(compiler.classify(&bare("person")), Kind::Ambiguous);
    }

    #[test]
    fn classify_promotes_known_helper() {
        let opts = Options::new().merged();
        let compiler = Compiler::new(&opts);
        assert_eq!(compiler.classify(&bare("each")), Kind::Helper);
    }

    #[test]
    fn classify_demotes_under_strict_mode() {
        let opts = Options::new().known_helpers_only(true).merged();
        let compiler = Compiler::new(&opts);
        assert_eq!(compiler.classify(&bare("person")), Kind::Simple);
    }

    #[test]
    fn classify_dotted_path_is_simple() {
        let opts = Options::new().merged();
        let compiler = Compiler::new(&opts);
        let mustache =
            ast::Mustache::new(ast::Path::new(["person", "name"]).into(), vec![], None);
        assert_eq!(compiler.classify(&mustache), Kind::Simple);
    }

    #[test]
    fn add_depth_skips_zero_and_dedupes() {
        let opts = Options::new().merged();
        let mut compiler = Compiler::new(&opts);
        compiler.add_depth(0);
        compiler.add_depth(2);
        compiler.add_depth(1);
        compiler.add_depth(2);
        let depths: Vec<usize> = compiler.depths.into_iter().collect();
        assert_eq!(depths, [1, 2]);
    }
}
