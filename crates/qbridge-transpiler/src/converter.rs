//! Converter trait and adapters for closures.

use std::any::{Any, type_name};
use std::fmt;

use thiserror::Error;

use crate::program::QuantumProgram;

/// Failure raised by a converter. The executor wraps it with edge context.
pub type ConverterError = Box<dyn std::error::Error + Send + Sync>;

/// A function from one representation to another.
///
/// Converters receive a private copy of the program and never see the
/// caller's original. The engine does not inspect what happens inside.
pub trait Converter: Send + Sync {
    /// Get the name of this converter.
    fn name(&self) -> &str;

    /// Convert the program.
    fn convert(
        &self,
        program: Box<dyn QuantumProgram>,
    ) -> Result<Box<dyn QuantumProgram>, ConverterError>;
}

/// The input handed to a converter was not the type it converts from.
#[derive(Debug, Error)]
#[error("Converter '{converter}' expected {expected} but received {found}")]
pub struct ProgramTypeMismatch {
    pub converter: String,
    pub expected: &'static str,
    pub found: &'static str,
}

type ConvertFn =
    Box<dyn Fn(Box<dyn QuantumProgram>) -> Result<Box<dyn QuantumProgram>, ConverterError> + Send + Sync>;

/// A converter backed by a closure.
pub struct FnConverter {
    name: String,
    f: ConvertFn,
}

impl FnConverter {
    /// Wrap a closure over type-erased programs.
    pub fn new(
        name: impl Into<String>,
        f: impl Fn(Box<dyn QuantumProgram>) -> Result<Box<dyn QuantumProgram>, ConverterError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            f: Box::new(f),
        }
    }

    /// Wrap a closure between two concrete representation types.
    ///
    /// The input is downcast to `I` before the closure runs; any other type
    /// fails with [`ProgramTypeMismatch`].
    pub fn typed<I, O, F>(name: impl Into<String>, f: F) -> Self
    where
        I: Any,
        O: QuantumProgram,
        F: Fn(I) -> Result<O, ConverterError> + Send + Sync + 'static,
    {
        let name = name.into();
        let converter = name.clone();
        Self::new(name, move |program| {
            let found = program.type_name();
            let input = program
                .downcast::<I>()
                .ok_or_else(|| ProgramTypeMismatch {
                    converter: converter.clone(),
                    expected: type_name::<I>(),
                    found,
                })?;
            let output = f(*input)?;
            Ok(Box::new(output) as Box<dyn QuantumProgram>)
        })
    }
}

impl Converter for FnConverter {
    fn name(&self) -> &str {
        &self.name
    }

    fn convert(
        &self,
        program: Box<dyn QuantumProgram>,
    ) -> Result<Box<dyn QuantumProgram>, ConverterError> {
        (self.f)(program)
    }
}

impl fmt::Debug for FnConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnConverter")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
