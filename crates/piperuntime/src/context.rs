use pipecore::{NodeId, Value};
use std::collections::HashMap;

/// Assembles the inputs array for one node from its predecessors' outputs.
///
/// `predecessors` must already be in topological visit order. Array outputs
/// are flattened one level; any other output is appended as a single
/// element. The asymmetry is the fan-in contract: a query node's row set
/// merges element-wise, a scalar status object arrives whole.
pub fn gather_inputs(
    predecessors: &[NodeId],
    outputs: &HashMap<NodeId, Value>,
) -> Vec<Value> {
    let mut inputs = Vec::new();
    for pred in predecessors {
        match outputs.get(pred) {
            Some(Value::Array(items)) => inputs.extend(items.iter().cloned()),
            Some(value) => inputs.push(value.clone()),
            // predecessor skipped or produced nothing: contributes nothing
            None => {}
        }
    }
    inputs
}
