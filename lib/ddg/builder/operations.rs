//! Assembly of program operations from their operand, trigger and
//! result moves, and the intra-operation edges of sealed operations.
//!
//! Operand moves of one operation arrive contiguously before the
//! trigger, in the same block; the upstream representation guarantees
//! this and it is not re-validated here.

use crate::ddg::builder::DataDependenceGraphBuilder;
use crate::ddg::{DependenceEdge, DependenceKind, DependenceType, NodeId};
use crate::error::*;
use crate::machine::OperationSignature;
use crate::program::PortRead;

impl<'m> DataDependenceGraphBuilder<'m> {
    fn pending_operation(&self, pending: &[usize], name: &str) -> Option<usize> {
        pending
            .iter()
            .position(|&operation| self.ddg.operation(operation).name() == name)
    }

    /// A move writing a non-triggering operand slot. Joins the pending
    /// operation of the same kind, or starts a new one.
    pub(super) fn process_operand(
        &mut self,
        node: NodeId,
        signature: &OperationSignature,
    ) -> Result<()> {
        let pending = self.bb_data[&self.current_block].dest_pending.clone();
        let operation = match self.pending_operation(&pending, signature.name()) {
            Some(position) => pending[position],
            None => {
                let operation = self.ddg.create_operation(signature.clone());
                self.bb_data
                    .get_mut(&self.current_block)
                    .expect("current block has no data")
                    .dest_pending
                    .push(operation);
                operation
            }
        };
        self.ddg.operation_mut(operation).add_input_node(node);
        self.ddg.node_mut(node).set_destination_operation(operation);
        Ok(())
    }

    /// The opcode-setting operand write. Once attached, the operation
    /// must have its full operand arity; it then waits for its result
    /// reads, or is sealed outright if it produces none.
    pub(super) fn process_trigger(
        &mut self,
        node: NodeId,
        signature: &OperationSignature,
    ) -> Result<()> {
        let pending = self.bb_data[&self.current_block].dest_pending.clone();
        let operation = match self.pending_operation(&pending, signature.name()) {
            Some(position) => {
                let operation = pending[position];
                self.bb_data
                    .get_mut(&self.current_block)
                    .expect("current block has no data")
                    .dest_pending
                    .remove(position);
                operation
            }
            None => {
                if signature.inputs() != 1 {
                    bail!(ErrorKind::IllegalProgram(format!(
                        "trigger without operand in {}",
                        self.ddg.node(node)
                    )));
                }
                self.ddg.create_operation(signature.clone())
            }
        };

        self.ddg.operation_mut(operation).add_input_node(node);
        self.ddg.operation_mut(operation).set_trigger(node);
        self.ddg.node_mut(node).set_destination_operation(operation);

        if !self.ddg.operation(operation).is_ready() {
            bail!(ErrorKind::IllegalProgram(format!(
                "trigger too early for {} in {}",
                signature.name(),
                self.ddg.node(node)
            )));
        }
        if signature.outputs() > 0 {
            self.bb_data
                .get_mut(&self.current_block)
                .expect("current block has no data")
                .read_pending
                .push(operation);
        }
        Ok(())
    }

    /// A move reading a result slot. Seals the operation and creates
    /// its intra-operation edges once every declared result is read.
    pub(super) fn process_result_read(&mut self, node: NodeId, port: &PortRead) -> Result<()> {
        let pending = self.bb_data[&self.current_block].read_pending.clone();
        let position = match self.pending_operation(&pending, port.operation()) {
            Some(position) => position,
            None => bail!(ErrorKind::IllegalProgram(format!(
                "result move without operands: {}",
                self.ddg.node(node)
            ))),
        };
        let operation = pending[position];

        self.ddg.operation_mut(operation).add_output_node(node);
        self.ddg.node_mut(node).set_source_operation(operation);

        if self.ddg.operation(operation).is_complete() {
            self.create_operation_edges(operation);
            self.bb_data
                .get_mut(&self.current_block)
                .expect("current block has no data")
                .read_pending
                .remove(position);
        }
        Ok(())
    }

    /// All-pairs edges from the operand moves to the result moves of a
    /// sealed operation.
    fn create_operation_edges(&mut self, operation: usize) {
        let name = self.ddg.operation(operation).name().to_string();
        let inputs = self.ddg.operation(operation).input_nodes().to_vec();
        let outputs = self.ddg.operation(operation).output_nodes().to_vec();
        for &input in &inputs {
            for &output in &outputs {
                let mut edge = DependenceEdge::new(
                    input,
                    output,
                    DependenceKind::Operation,
                    DependenceType::Unknown,
                );
                edge.set_data(name.clone());
                self.ddg.connect_or_merge(edge);
            }
        }
    }
}
