//! Disassembly of compiled programs.
//!
//! Produces one line per instruction in emission order: the instruction name
//! followed by space-separated arguments. String arguments are quoted with
//! embedded newlines escaped, and declared constants use the distinct
//! `DECLARE name=value` form.

use std::fmt;

use crate::instr::{Environment, Literal, Opcode};

impl Environment {
    /// Render this environment's opcode stream as a disassembly listing.
    ///
    /// Child environments are not included; disassemble them individually
    /// via [`children`][Environment::children].
    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        for (i, opcode) in self.opcodes.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&opcode.to_string());
        }
        out
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Opcode::AppendContent(s) => write!(f, "appendContent {}", Quoted(s)),
            Opcode::Append => f.write_str("append"),
            Opcode::AppendEscaped => f.write_str("appendEscaped"),
            Opcode::GetContext(depth) => write!(f, "getContext {depth}"),
            Opcode::PushContext => f.write_str("pushContext"),
            Opcode::LookupOnContext(name) => write!(f, "lookupOnContext {}", Quoted(name)),
            Opcode::Lookup(name) => write!(f, "lookup {}", Quoted(name)),
            Opcode::LookupData => f.write_str("lookupData"),
            Opcode::PushProgram(Some(id)) => write!(f, "pushProgram {id}"),
            Opcode::PushProgram(None) => f.write_str("pushProgram"),
            Opcode::PushString(s) => write!(f, "pushString {}", Quoted(s)),
            Opcode::PushLiteral(lit) => write!(f, "pushLiteral {lit}"),
            Opcode::PushStringParam { value, kind } => {
                write!(f, "pushStringParam {} {}", Quoted(value), Quoted(kind))
            }
            Opcode::ResolvePossibleLambda => f.write_str("resolvePossibleLambda"),
            Opcode::InvokeHelper { argc, name } => {
                write!(f, "invokeHelper {argc} {}", Quoted(name))
            }
            Opcode::InvokeKnownHelper { argc, name } => {
                write!(f, "invokeKnownHelper {argc} {}", Quoted(name))
            }
            Opcode::InvokeAmbiguous { name, is_block } => {
                write!(f, "invokeAmbiguous {} {is_block}", Quoted(name))
            }
            Opcode::InvokePartial(name) => write!(f, "invokePartial {}", Quoted(name)),
            Opcode::EmptyHash => f.write_str("emptyHash"),
            Opcode::PushHash => f.write_str("pushHash"),
            Opcode::AssignToHash(key) => write!(f, "assignToHash {}", Quoted(key)),
            Opcode::PopHash => f.write_str("popHash"),
            Opcode::BlockValue => f.write_str("blockValue"),
            Opcode::AmbiguousBlockValue => f.write_str("ambiguousBlockValue"),
            Opcode::Declare { name, value } => write!(f, "DECLARE {name}={value}"),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(n) => write!(f, "{n}"),
            Literal::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// A string argument, quoted with embedded newlines escaped.
struct Quoted<'a>(&'a str);

impl fmt::Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"")?;
        for c in self.0.chars() {
            match c {
                '\n' => f.write_str("\\n")?,
                c => fmt::Write::write_char(f, c)?,
            }
        }
        f.write_str("\"")
    }
}
