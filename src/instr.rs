//! Defines the compiled [`Environment`] which is a sequence of [`Opcode`]
//! that can be turned into an executable renderer by a code generator.
//!
//! The stream has stack-machine semantics: later instructions consume values
//! produced by earlier ones. Nested block and partial bodies are compiled as
//! independent child environments and referenced by index.

/// One instruction of the opcode program.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Opcode {
    /// Emit literal template text.
    AppendContent(String),

    /// Emit the value on top of the stack verbatim.
    Append,

    /// Emit the value on top of the stack, HTML-escaped.
    AppendEscaped,

    /// Select the ancestor context at the given depth.
    GetContext(usize),

    /// Push the selected context itself.
    PushContext,

    /// Look up a name on the selected context and push the result.
    LookupOnContext(String),

    /// Look up a field on the value on top of the stack.
    Lookup(String),

    /// Push the root of the private-data channel.
    LookupData,

    /// Push a child program by index; `None` is the explicit "no program"
    /// marker for an absent block body.
    PushProgram(Option<usize>),

    /// Push a string literal.
    PushString(String),

    /// Push an integer or boolean literal.
    PushLiteral(Literal),

    /// Push the static textual form of a parameter (string-params mode).
    PushStringParam { value: String, kind: &'static str },

    /// Invoke the value on top of the stack if it is callable.
    ResolvePossibleLambda,

    /// Invoke a helper by name, falling back to `helperMissing`.
    InvokeHelper { argc: usize, name: String },

    /// Invoke a helper that is statically known to exist.
    InvokeKnownHelper { argc: usize, name: String },

    /// Defer the helper-vs-value decision for a bare name to execution.
    InvokeAmbiguous { name: String, is_block: bool },

    /// Render a partial with the context on top of the stack.
    InvokePartial(String),

    /// Push an empty named-argument set.
    EmptyHash,

    /// Open a named-argument set.
    PushHash,

    /// Assign the value on top of the stack to a key of the open hash.
    AssignToHash(String),

    /// Close the open named-argument set.
    PopHash,

    /// Execute a plain context value in block position via
    /// `blockHelperMissing`.
    BlockValue,

    /// As [`BlockValue`][Opcode::BlockValue], after an ambiguous resolution.
    AmbiguousBlockValue,

    /// A compile-time constant for the code generator.
    Declare { name: String, value: String },
}

/// A literal opcode argument.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Literal {
    Int(i64),
    Bool(bool),
}

/// The compiled result of one program.
///
/// `depths` holds the set of referenced ancestor depths, sorted ascending;
/// depth 0 is implicit and never recorded. Children are indexed in
/// left-to-right discovery order starting at 0.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Environment {
    pub opcodes: Vec<Opcode>,
    pub children: Vec<Environment>,
    pub depths: Vec<usize>,
    pub use_partial: bool,
    pub use_data: bool,
    pub is_simple: bool,
}

impl Environment {
    /// Structural equality: pairwise-identical opcodes and recursively equal
    /// children. Summary flags and depth sets are derived from the opcodes
    /// and are not compared.
    pub fn equals(&self, other: &Environment) -> bool {
        self.opcodes == other.opcodes
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(a, b)| a.equals(b))
    }
}
