//! The compile step: turning a resolved pack into whatever artifact the
//! caller needs, in dependency order.

use std::sync::Arc;

use miette::Diagnostic;
use thiserror::Error;

use packsmith_core::package::Package;

use crate::registry::Registry;

/// A compiler rejected a pack.
#[derive(Debug, Clone, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(packsmith::compile::failed))]
pub struct CompileFailure {
    pub message: String,
}

impl CompileFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Turns a resolved pack into an artifact.
///
/// Called once per pack, after every pack in its filtered map has been
/// published to `registry`.
pub trait Compiler {
    type Artifact;

    fn compile(
        &mut self,
        package: &Package,
        registry: &Registry,
    ) -> Result<Self::Artifact, CompileFailure>;
}

impl<A, F> Compiler for F
where
    F: FnMut(&Package, &Registry) -> Result<A, CompileFailure>,
{
    type Artifact = A;

    fn compile(&mut self, package: &Package, registry: &Registry) -> Result<A, CompileFailure> {
        self(package, registry)
    }
}

/// A pack that compiled and was published, with its artifact.
#[derive(Debug, Clone)]
pub struct Compiled<A> {
    pub package: Arc<Package>,
    pub artifact: A,
}

/// Compiles nothing; only publishes. Useful to validate a batch and make it
/// available as dependencies for the next one.
#[derive(Debug, Default, Clone, Copy)]
pub struct PublishOnly;

impl Compiler for PublishOnly {
    type Artifact = ();

    fn compile(&mut self, _package: &Package, _registry: &Registry) -> Result<(), CompileFailure> {
        Ok(())
    }
}
