//! Method bodies.
//!
//! Instructions are kept decoded: the only thing the stripper needs from a body is the set
//! of metadata tokens its instructions reference, plus the local variable types and the
//! exception handler catch types.

use crate::metadata::{signatures::TypeSignature, token::Token};

/// An operand of a CIL instruction
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// No operand
    None,
    /// Integer immediate (`ldc.i4`, `ldc.i8`, ...)
    Immediate(i64),
    /// Floating-point immediate (`ldc.r4`, `ldc.r8`)
    Float(f64),
    /// Branch target offset
    Target(u32),
    /// Jump table of a `switch`
    Switch(Vec<u32>),
    /// Metadata token (`call`, `newobj`, `ldfld`, `castclass`, `ldtoken`, ...)
    Token(Token),
    /// User string (`ldstr`)
    String(String),
    /// Local variable index
    Local(u16),
    /// Argument index
    Argument(u16),
}

/// A decoded CIL instruction
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// Offset of the instruction inside the body
    pub offset: u32,
    /// Instruction mnemonic, e.g. `newobj`
    pub mnemonic: &'static str,
    /// The operand
    pub operand: Operand,
}

impl Instruction {
    /// Creates an instruction without operand
    #[must_use]
    pub fn simple(offset: u32, mnemonic: &'static str) -> Self {
        Instruction {
            offset,
            mnemonic,
            operand: Operand::None,
        }
    }

    /// Creates an instruction that references a metadata token
    #[must_use]
    pub fn with_token(offset: u32, mnemonic: &'static str, token: Token) -> Self {
        Instruction {
            offset,
            mnemonic,
            operand: Operand::Token(token),
        }
    }

    /// The metadata token referenced by this instruction, if any
    #[must_use]
    pub fn token(&self) -> Option<Token> {
        match self.operand {
            Operand::Token(token) => Some(token),
            _ => None,
        }
    }
}

/// Kind of an exception handling clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionHandlerKind {
    /// Typed `catch` clause
    Catch,
    /// `filter` clause
    Filter,
    /// `finally` clause
    Finally,
    /// `fault` clause
    Fault,
}

/// An exception handling clause
#[derive(Debug, Clone, PartialEq)]
pub struct ExceptionHandler {
    /// Kind of the clause
    pub kind: ExceptionHandlerKind,
    /// Start of the protected region
    pub try_offset: u32,
    /// Length of the protected region
    pub try_length: u32,
    /// Start of the handler
    pub handler_offset: u32,
    /// Length of the handler
    pub handler_length: u32,
    /// Caught exception type for [`ExceptionHandlerKind::Catch`]
    pub catch_type: Option<Token>,
}

/// Body of a method with IL code
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MethodBody {
    /// Maximum evaluation stack depth
    pub max_stack: u16,
    /// Local variable types
    pub locals: Vec<TypeSignature>,
    /// The instructions
    pub instructions: Vec<Instruction>,
    /// Exception handling clauses
    pub exception_handlers: Vec<ExceptionHandler>,
}

impl MethodBody {
    /// Creates a body from a list of instructions
    #[must_use]
    pub fn new(instructions: Vec<Instruction>) -> Self {
        MethodBody {
            max_stack: 8,
            instructions,
            ..MethodBody::default()
        }
    }

    /// Iterates over every metadata token referenced by an instruction operand
    pub fn operand_tokens(&self) -> impl Iterator<Item = Token> + '_ {
        self.instructions.iter().filter_map(Instruction::token)
    }
}
