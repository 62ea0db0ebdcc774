//! The operation tape.
//!
//! A [`Tape`] is an append-only arena of operations addressed by
//! [`NodeIndex`]. Every operand index is strictly below the index of the
//! node that uses it, so walking the arena in increasing order is a
//! topological traversal and walking it backward is a reverse one.
//!
//! Sweeps take `&self` and own their scratch state, so any number of them
//! may read one tape concurrently once recording is finished.

use std::ops::Range;

use crate::opcode::{CustomId, OpCode, OpKind, UNUSED};

// Submodules: each adds impl blocks to Tape
mod forward;
mod jacobian;
mod reverse;
mod sparsity;

#[cfg(feature = "parallel")]
mod parallel;

pub use self::forward::ForwardSweep;
pub use self::sparsity::HessianSweep;

/// Dense, zero-based position of a node on the tape.
pub type NodeIndex = u32;

/// Structural signature of a custom opcode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomSignature {
    pub name: String,
    pub kind: OpKind,
}

/// Read-only view of one tape entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Operation {
    /// Index of the node this operation defines.
    pub result: NodeIndex,
    pub opcode: OpCode,
    pub kind: OpKind,
    /// Operand indices; slots past the arity hold [`UNUSED`]. For `Const`
    /// nodes `args[0]` indexes the constant table instead.
    pub args: [NodeIndex; 2],
}

impl Operation {
    /// The operand node indices (empty for leaves).
    pub fn operands(&self) -> &[NodeIndex] {
        &self.args[..self.kind.arity()]
    }
}

/// Recorded computation: independent variables, constants, and elementary
/// operations in topological order.
#[derive(Clone, Debug, Default)]
pub struct Tape {
    pub(crate) opcodes: Vec<OpCode>,
    pub(crate) arg_indices: Vec<[u32; 2]>,
    pub(crate) constants: Vec<f64>,
    pub(crate) custom: Vec<CustomSignature>,
    pub(crate) num_independent: u32,
    pub(crate) outputs: Vec<NodeIndex>,
}

impl Tape {
    /// Create an empty tape.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty tape with room for `est_ops` nodes.
    pub fn with_capacity(est_ops: usize) -> Self {
        Tape {
            opcodes: Vec::with_capacity(est_ops),
            arg_indices: Vec::with_capacity(est_ops),
            ..Self::default()
        }
    }

    #[inline]
    fn next_index(&self) -> NodeIndex {
        assert!(
            self.opcodes.len() < UNUSED as usize,
            "tape exceeds the node index range"
        );
        self.opcodes.len() as NodeIndex
    }

    /// Declare `count` independent variables. Returns their index range.
    ///
    /// Independent variables occupy the lowest indices, so this must be
    /// called before any constant or operation is recorded.
    pub fn declare_independent(&mut self, count: usize) -> Range<NodeIndex> {
        assert_eq!(
            self.opcodes.len(),
            self.num_independent as usize,
            "independent variables must be declared before any other node"
        );
        assert!(
            self.opcodes.len() + count < UNUSED as usize,
            "tape exceeds the node index range"
        );
        let start = self.num_independent;
        self.opcodes.extend(std::iter::repeat(OpCode::Input).take(count));
        self.arg_indices.extend(std::iter::repeat([UNUSED, UNUSED]).take(count));
        self.num_independent += count as u32;
        start..self.num_independent
    }

    /// Record a constant. Returns its index.
    pub fn constant(&mut self, value: f64) -> NodeIndex {
        let idx = self.next_index();
        let slot = self.constants.len() as u32;
        self.constants.push(value);
        self.opcodes.push(OpCode::Const);
        self.arg_indices.push([slot, UNUSED]);
        idx
    }

    /// Declare a custom opcode with the given structural classification.
    ///
    /// The kind selects the sparsity rules applied to the opcode and fixes
    /// its arity. Numeric rules are supplied separately through a
    /// [`Registry`](crate::Registry).
    pub fn declare_custom(&mut self, name: impl Into<String>, kind: OpKind) -> CustomId {
        assert!(!kind.is_leaf(), "custom opcodes cannot be leaves");
        let idx = self.custom.len();
        assert!(idx <= u16::MAX as usize, "too many custom ops");
        self.custom.push(CustomSignature {
            name: name.into(),
            kind,
        });
        CustomId(idx as u16)
    }

    /// Signature of a declared custom opcode.
    pub fn custom_signature(&self, id: CustomId) -> Option<&CustomSignature> {
        self.custom.get(id.index())
    }

    /// Record an operation. Returns the result index, which is the tape
    /// length before the call.
    ///
    /// # Panics
    ///
    /// If `op` is a leaf opcode, if the number of operands differs from the
    /// opcode's arity, or if any operand is not strictly below the result.
    pub fn append(&mut self, op: OpCode, operands: &[NodeIndex]) -> NodeIndex {
        let kind = self.kind(op);
        assert!(
            !kind.is_leaf(),
            "{op} is a leaf; use declare_independent or constant"
        );
        assert_eq!(
            operands.len(),
            kind.arity(),
            "{op} takes {} operand(s)",
            kind.arity()
        );
        let idx = self.next_index();
        for &arg in operands {
            assert!(arg < idx, "operand {arg} of {op} must precede result {idx}");
        }
        let args = [operands[0], operands.get(1).copied().unwrap_or(UNUSED)];
        self.opcodes.push(op);
        self.arg_indices.push(args);
        idx
    }

    /// Mark the output nodes.
    pub fn set_outputs(&mut self, indices: &[NodeIndex]) {
        for &idx in indices {
            assert!(
                (idx as usize) < self.opcodes.len(),
                "output {idx} out of range ({})",
                self.opcodes.len()
            );
        }
        self.outputs = indices.to_vec();
    }

    /// Output node indices, in the order they were set.
    #[inline]
    pub fn outputs(&self) -> &[NodeIndex] {
        &self.outputs
    }

    /// Number of independent variables.
    #[inline]
    pub fn num_independent(&self) -> usize {
        self.num_independent as usize
    }

    /// Number of nodes (independents, constants, and operations).
    #[inline]
    pub fn len(&self) -> usize {
        self.opcodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.opcodes.is_empty()
    }

    /// Structural classification of `op` on this tape.
    ///
    /// # Panics
    ///
    /// If `op` is a custom opcode not declared on this tape.
    #[inline]
    pub fn kind(&self, op: OpCode) -> OpKind {
        match op {
            OpCode::Custom(id) => match self.custom.get(id.index()) {
                Some(sig) => sig.kind,
                None => panic!("{id} is not declared on this tape"),
            },
            op => op.builtin_kind().unwrap_or(OpKind::Parameter),
        }
    }

    /// The operation recorded at `index`.
    pub fn operation(&self, index: NodeIndex) -> Operation {
        let i = index as usize;
        assert!(i < self.opcodes.len(), "node {index} out of range");
        let opcode = self.opcodes[i];
        Operation {
            result: index,
            opcode,
            kind: self.kind(opcode),
            args: self.arg_indices[i],
        }
    }

    /// All operations in increasing index order.
    pub fn operations(&self) -> impl Iterator<Item = Operation> + '_ {
        (0..self.opcodes.len()).map(|i| self.operation(i as NodeIndex))
    }

    /// Value of a `Const` node.
    pub fn constant_value(&self, index: NodeIndex) -> Option<f64> {
        let i = index as usize;
        match self.opcodes.get(i) {
            Some(OpCode::Const) => Some(self.constants[self.arg_indices[i][0] as usize]),
            _ => None,
        }
    }

    /// Whether node `index` is a constant leaf.
    #[inline]
    pub(crate) fn is_parameter(&self, index: u32) -> bool {
        self.opcodes[index as usize] == OpCode::Const
    }
}
