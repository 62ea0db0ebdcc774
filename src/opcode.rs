//! Opcodes recorded on the tape and their built-in rules.
//!
//! Each opcode carries a structural classification ([`OpKind`]) used by the
//! sparsity sweeps, and the built-in ones a value rule ([`eval`]) and a
//! first-derivative rule ([`partials`]) used by the value sweeps. Custom
//! opcodes get their classification from the tape and their rules from a
//! [`Registry`](crate::Registry).

use std::fmt;

use crate::base::Base;

/// Sentinel used in `args[1]` for unary ops and in both slots for leaves.
pub const UNUSED: u32 = u32::MAX;

/// Identifier of a custom opcode declared on a tape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CustomId(pub(crate) u16);

impl CustomId {
    /// Position of this opcode in the tape's custom table.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CustomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "custom#{}", self.0)
    }
}

/// Elementary operation codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpCode {
    // ── Leaves ──
    /// Independent variable.
    Input,
    /// Constant; `args[0]` indexes the tape's constant table.
    Const,

    // ── Binary ──
    Add,
    Sub,
    Mul,
    Div,
    Pow,

    // ── Unary ──
    Neg,
    Recip,
    Sqrt,
    Exp,
    Ln,

    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,

    Sinh,
    Cosh,
    Tanh,

    /// Caller-declared operation, see [`Tape::declare_custom`](crate::Tape::declare_custom).
    Custom(CustomId),
}

impl OpCode {
    /// Structural classification of a built-in opcode. `None` for
    /// [`OpCode::Custom`], whose kind lives on the tape.
    pub fn builtin_kind(self) -> Option<OpKind> {
        let kind = match self {
            OpCode::Input => OpKind::Independent,
            OpCode::Const => OpKind::Parameter,

            OpCode::Add | OpCode::Sub => OpKind::LinearBinary,
            OpCode::Mul => OpKind::NonlinearBinary(CrossTerms::MUL),
            OpCode::Div => OpKind::NonlinearBinary(CrossTerms::DIV),
            OpCode::Pow => OpKind::NonlinearBinary(CrossTerms::POW),

            OpCode::Neg => OpKind::LinearUnary,
            OpCode::Recip
            | OpCode::Sqrt
            | OpCode::Exp
            | OpCode::Ln
            | OpCode::Sin
            | OpCode::Cos
            | OpCode::Tan
            | OpCode::Asin
            | OpCode::Acos
            | OpCode::Atan
            | OpCode::Sinh
            | OpCode::Cosh
            | OpCode::Tanh => OpKind::NonlinearUnary,

            OpCode::Custom(_) => return None,
        };
        Some(kind)
    }

    fn name(self) -> &'static str {
        match self {
            OpCode::Input => "input",
            OpCode::Const => "const",
            OpCode::Add => "add",
            OpCode::Sub => "sub",
            OpCode::Mul => "mul",
            OpCode::Div => "div",
            OpCode::Pow => "pow",
            OpCode::Neg => "neg",
            OpCode::Recip => "recip",
            OpCode::Sqrt => "sqrt",
            OpCode::Exp => "exp",
            OpCode::Ln => "ln",
            OpCode::Sin => "sin",
            OpCode::Cos => "cos",
            OpCode::Tan => "tan",
            OpCode::Asin => "asin",
            OpCode::Acos => "acos",
            OpCode::Atan => "atan",
            OpCode::Sinh => "sinh",
            OpCode::Cosh => "cosh",
            OpCode::Tanh => "tanh",
            OpCode::Custom(_) => "custom",
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpCode::Custom(id) => write!(f, "{id}"),
            op => f.write_str(op.name()),
        }
    }
}

/// Second-order structure of a nonlinear binary operator `z = f(x, y)`.
///
/// Each flag names one union performed by the reverse Hessian sweep when the
/// result still influences the differentiated scalar: `x_y` means the
/// forward-Jacobian set of `y` is unioned into the Hessian set of `x`
/// (`∂²z/∂x∂y` may be nonzero), and so on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CrossTerms {
    pub x_x: bool,
    pub x_y: bool,
    pub y_x: bool,
    pub y_y: bool,
}

impl CrossTerms {
    /// Linear in both operands.
    pub const NONE: CrossTerms = CrossTerms {
        x_x: false,
        x_y: false,
        y_x: false,
        y_y: false,
    };
    /// `x * y`: only the mixed partials are nonzero.
    pub const MUL: CrossTerms = CrossTerms {
        x_x: false,
        x_y: true,
        y_x: true,
        y_y: false,
    };
    /// `x / y`: linear in `x`, nonlinear in `y`.
    pub const DIV: CrossTerms = CrossTerms {
        x_x: false,
        x_y: true,
        y_x: true,
        y_y: true,
    };
    /// `pow(x, y)`: nonlinear in both operands.
    pub const POW: CrossTerms = CrossTerms {
        x_x: true,
        x_y: true,
        y_x: true,
        y_y: true,
    };

    /// Whether any second-order union is generated.
    pub fn any(self) -> bool {
        self.x_x || self.x_y || self.y_x || self.y_y
    }
}

/// Structural classification selecting the sparsity rule of an opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// Independent variable leaf.
    Independent,
    /// Constant leaf; depends on nothing.
    Parameter,
    /// `z = f(x)` with constant `f'`.
    LinearUnary,
    /// `z = f(x, y)` with constant partials.
    LinearBinary,
    /// `z = f(x)` with nonzero `f''`.
    NonlinearUnary,
    /// `z = f(x, y)` with the given second-order structure.
    NonlinearBinary(CrossTerms),
    /// `z = f(x)` with identically zero derivative (piecewise constant).
    DiscreteUnary,
}

impl OpKind {
    /// Number of operands.
    pub fn arity(self) -> usize {
        match self {
            OpKind::Independent | OpKind::Parameter => 0,
            OpKind::LinearUnary | OpKind::NonlinearUnary | OpKind::DiscreteUnary => 1,
            OpKind::LinearBinary | OpKind::NonlinearBinary(_) => 2,
        }
    }

    /// Leaves are created by `declare_independent` / `constant`, never `append`.
    pub fn is_leaf(self) -> bool {
        matches!(self, OpKind::Independent | OpKind::Parameter)
    }

    /// Second derivatives vanish identically.
    pub fn is_linear(self) -> bool {
        match self {
            OpKind::NonlinearUnary => false,
            OpKind::NonlinearBinary(cross) => !cross.any(),
            _ => true,
        }
    }

    /// Whether the reverse Hessian sweep generates cross-term unions.
    pub fn has_cross_terms(self) -> bool {
        match self {
            OpKind::NonlinearUnary => true,
            OpKind::NonlinearBinary(cross) => cross.any(),
            _ => false,
        }
    }

    /// Whether the derivative is identically zero.
    pub fn is_discrete(self) -> bool {
        matches!(self, OpKind::DiscreteUnary)
    }
}

/// Evaluate a built-in opcode.
///
/// For unary ops `y` is ignored.
#[inline]
pub fn eval<T: Base>(op: OpCode, x: T, y: T) -> T {
    match op {
        OpCode::Input | OpCode::Const => {
            unreachable!("leaf values are seeded by the sweep, not evaluated")
        }

        OpCode::Add => x + y,
        OpCode::Sub => x - y,
        OpCode::Mul => x * y,
        OpCode::Div => x / y,
        OpCode::Pow => x.powf(y),

        OpCode::Neg => -x,
        OpCode::Recip => T::one() / x,
        OpCode::Sqrt => x.sqrt(),
        OpCode::Exp => x.exp(),
        OpCode::Ln => x.ln(),

        OpCode::Sin => x.sin(),
        OpCode::Cos => x.cos(),
        OpCode::Tan => x.tan(),
        OpCode::Asin => x.asin(),
        OpCode::Acos => x.acos(),
        OpCode::Atan => x.atan(),

        OpCode::Sinh => x.sinh(),
        OpCode::Cosh => x.cosh(),
        OpCode::Tanh => x.tanh(),

        OpCode::Custom(_) => unreachable!("custom ops are dispatched through the registry"),
    }
}

/// Partial derivatives `(∂z/∂x, ∂z/∂y)` of a built-in opcode.
///
/// `z` is the result value. For unary ops the second partial is zero.
#[inline]
pub fn partials<T: Base>(op: OpCode, x: T, y: T, z: T) -> (T, T) {
    let zero = T::zero();
    let one = T::one();
    match op {
        OpCode::Input | OpCode::Const => (zero, zero),

        OpCode::Add => (one, one),
        OpCode::Sub => (one, -one),
        OpCode::Mul => (y, x),
        OpCode::Div => {
            let inv = one / y;
            (inv, -z * inv)
        }
        OpCode::Pow => {
            // d/dx x^y = y x^(y-1), d/dy x^y = x^y ln x
            (y * x.powf(y - one), z * x.ln())
        }

        OpCode::Neg => (-one, zero),
        OpCode::Recip => (-(z * z), zero),
        OpCode::Sqrt => (one / (z + z), zero),
        OpCode::Exp => (z, zero),
        OpCode::Ln => (one / x, zero),

        OpCode::Sin => (x.cos(), zero),
        OpCode::Cos => (-x.sin(), zero),
        OpCode::Tan => (one + z * z, zero),
        OpCode::Asin => (one / (one - x * x).sqrt(), zero),
        OpCode::Acos => (-(one / (one - x * x).sqrt()), zero),
        OpCode::Atan => (one / (one + x * x), zero),

        OpCode::Sinh => (x.cosh(), zero),
        OpCode::Cosh => (x.sinh(), zero),
        OpCode::Tanh => (one - z * z, zero),

        OpCode::Custom(_) => unreachable!("custom ops are dispatched through the registry"),
    }
}
