//! Pass trait and the pass manager.

use tracing::debug;

use skinfaxi_ir::Circuit;

use crate::error::CompileResult;

/// A compilation pass over the canonical circuit.
///
/// Passes rewrite the operation list in place; register declarations may
/// only change when the pass itself re-declares them (the layout pass does).
pub trait Pass: Send + Sync {
    /// Name of this pass.
    fn name(&self) -> &str;

    /// Run the pass on the given circuit.
    fn run(&self, circuit: &mut Circuit) -> CompileResult<()>;

    /// Whether this pass has anything to do for the given circuit.
    fn should_run(&self, _circuit: &Circuit) -> bool {
        true
    }
}

/// Executes a sequence of passes in order.
#[derive(Default)]
pub struct PassManager {
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Create an empty pass manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pass.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Run all passes on the circuit.
    pub fn run(&self, circuit: &mut Circuit) -> CompileResult<()> {
        for pass in &self.passes {
            if pass.should_run(circuit) {
                debug!("Running pass: {}", pass.name());
                pass.run(circuit)?;
                debug!("Pass {} completed, ops: {}", pass.name(), circuit.ops().len());
            } else {
                debug!("Skipping pass: {}", pass.name());
            }
        }
        Ok(())
    }

    /// Number of registered passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Whether the manager has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}
