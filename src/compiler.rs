use crate::error::Result;
use crate::mutator::Mutator;
use crate::transform;
use crate::types::CompiledUpdate;
use serde_json::Value;

const SEPARATOR: &str = ";";

/// Compile a mutator into a single update script.
///
/// Operations are translated in mutator order and all of their fragments are
/// joined with `;` into one flat statement list. Nothing is returned unless
/// every operation translates.
pub fn compile(mutator: &Mutator) -> Result<CompiledUpdate> {
    let mut fragments = Vec::new();
    for operation in mutator.operations() {
        fragments.extend(transform::fragments(operation)?);
    }

    let script = fragments.join(SEPARATOR);
    tracing::debug!(
        operations = mutator.operations().len(),
        statements = fragments.len(),
        "compiled mutator: {}",
        script
    );
    Ok(CompiledUpdate { script })
}

/// Parse a JSON mutator and compile it.
pub fn compile_json(mutator: &Value) -> Result<CompiledUpdate> {
    compile(&Mutator::from_json(mutator)?)
}
