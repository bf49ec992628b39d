//! The adaptation state machine.
//!
//! Given a raw program, produce a canonical circuit that the chosen target
//! accepts, through a bounded sequence of fallbacks. The machine inspects
//! tagged outcomes at every stage — nothing in here is driven by caught
//! faults — and its single precompile retry guarantees termination:
//!
//! 1. (retry only) precompile the *raw program* into the broadly-supported
//!    vocabulary,
//! 2. canonicalize; an untranslatable construct consumes the retry or, if it
//!    is already consumed, ends the run,
//! 3. if the canonical circuit already satisfies the target, return it
//!    unchanged,
//! 4. compile for the target; qubit overflow is terminal and never retried,
//! 5. re-validate; an invalid result consumes the retry or ends the run.
//!
//! [`canonicalize_program`] is the analysis-mode entry and stops after
//! step 2; [`adapt_for_target`] runs the full loop.

use tracing::{debug, warn};

use skinfaxi_hal::{CompileOutcome, Target};
use skinfaxi_ir::{Circuit, CircuitStats};

use crate::canonical::{CanonicalOutcome, to_canonical};
use crate::error::AdaptError;
use crate::precompile::precompile;
use crate::program::RawProgram;

/// A canonicalized program with its statistics.
#[derive(Debug, Clone)]
pub struct Canonicalized {
    /// The canonical circuit.
    pub circuit: Circuit,
    /// Statistics of the circuit as written, before any target adaptation.
    pub stats: CircuitStats,
    /// Whether the precompile fallback was needed.
    pub precompiled: bool,
}

/// Result of adapting a program for a target.
#[derive(Debug, Clone)]
pub struct AdaptReport {
    /// The target-valid circuit.
    pub circuit: Circuit,
    /// Statistics before target compilation.
    pub original: CircuitStats,
    /// Statistics of the adapted circuit.
    pub compiled: CircuitStats,
    /// Whether the precompile fallback was needed.
    pub precompiled: bool,
}

/// Canonicalize a raw program, retrying once through the precompiler.
pub fn canonicalize_program(program: &RawProgram) -> Result<Canonicalized, AdaptError> {
    let mut precompiled = false;
    loop {
        let working = if precompiled {
            precompile(program)?
        } else {
            program.clone()
        };

        match to_canonical(&working)? {
            CanonicalOutcome::Canonical(circuit) => {
                let stats = CircuitStats::of(&circuit);
                return Ok(Canonicalized {
                    circuit,
                    stats,
                    precompiled,
                });
            }
            CanonicalOutcome::Unsupported { construct } => {
                if precompiled {
                    warn!("Precompilation did not resolve construct: {}", construct);
                    return Err(AdaptError::Unsupported { construct });
                }
                warn!("Unsupported construct ({}), precompiling and retrying", construct);
                precompiled = true;
            }
        }
    }
}

/// Run the full adaptation loop against a target.
pub fn adapt_for_target(
    program: &RawProgram,
    target: &dyn Target,
) -> Result<AdaptReport, AdaptError> {
    let mut precompiled = false;
    let mut original: Option<CircuitStats> = None;

    loop {
        let working = if precompiled {
            precompile(program)?
        } else {
            program.clone()
        };

        let circuit = match to_canonical(&working)? {
            CanonicalOutcome::Canonical(circuit) => circuit,
            CanonicalOutcome::Unsupported { construct } => {
                if precompiled {
                    warn!("Precompilation did not resolve construct: {}", construct);
                    return Err(AdaptError::Unsupported { construct });
                }
                warn!("Unsupported construct ({}), precompiling and retrying", construct);
                precompiled = true;
                continue;
            }
        };

        // Statistics of the first successfully canonicalized circuit.
        let original = *original.get_or_insert_with(|| CircuitStats::of(&circuit));

        // Fixed point: an already-valid circuit is returned unchanged.
        if target.validate(&circuit).is_valid() {
            debug!("Circuit already valid for {}", target.profile().device);
            return Ok(AdaptReport {
                compiled: CircuitStats::of(&circuit),
                circuit,
                original,
                precompiled,
            });
        }

        let compiled = match target.compile(&circuit) {
            CompileOutcome::Compiled(compiled) => compiled,
            CompileOutcome::TooManyQubits { required, limit } => {
                debug!("Circuit needs {} qubits, target has {}", required, limit);
                return Err(AdaptError::TooManyQubits { required, limit });
            }
            CompileOutcome::Failed(reason) => {
                return Err(AdaptError::CompileFailed(reason));
            }
        };

        let report = target.validate(&compiled);
        if report.is_valid() {
            return Ok(AdaptReport {
                compiled: CircuitStats::of(&compiled),
                circuit: compiled,
                original,
                precompiled,
            });
        }

        if precompiled {
            return Err(AdaptError::StillInvalid(report.describe()));
        }
        warn!(
            "Compiled circuit invalid ({}), precompiling and retrying",
            report.describe()
        );
        precompiled = true;
    }
}
