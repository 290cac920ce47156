//! Type-erased program values carried through the conversion graph.
//!
//! Every representation is a plain Rust type. The graph moves values of
//! these types as `Box<dyn QuantumProgram>`; converters downcast their input
//! to the concrete type they expect.

use std::any::{Any, type_name};
use std::fmt;

use serde::{Deserialize, Serialize};

/// A program in some representation.
///
/// Implemented for every `Clone + Send + Sync + Debug + 'static` type, so
/// representation types need no boilerplate.
pub trait QuantumProgram: Any + Send + Sync + fmt::Debug {
    /// Clone into a new box. The executor hands each converter its own copy.
    fn clone_boxed(&self) -> Box<dyn QuantumProgram>;

    /// Borrow as [`Any`] for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Convert into a boxed [`Any`] for owned downcasting.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// Name of the concrete Rust type.
    fn type_name(&self) -> &'static str;
}

impl<T> QuantumProgram for T
where
    T: Any + Clone + Send + Sync + fmt::Debug,
{
    fn clone_boxed(&self) -> Box<dyn QuantumProgram> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

impl dyn QuantumProgram {
    /// Whether the program is of type `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Borrow the program as `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    /// Take the program as `T`.
    pub fn downcast<T: Any>(self: Box<Self>) -> Option<Box<T>> {
        self.into_any().downcast().ok()
    }
}

/// `OpenQASM` 2 source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Qasm2(pub String);

/// `OpenQASM` 3 source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Qasm3(pub String);

impl Qasm2 {
    /// Wrap source text.
    pub fn new(source: impl Into<String>) -> Self {
        Self(source.into())
    }

    /// The source text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Qasm3 {
    /// Wrap source text.
    pub fn new(source: impl Into<String>) -> Self {
        Self(source.into())
    }

    /// The source text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Qasm2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for Qasm3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downcast() {
        let program: Box<dyn QuantumProgram> = Box::new(Qasm3::new("qubit q;"));
        assert!(program.is::<Qasm3>());
        assert!(!program.is::<Qasm2>());
        assert_eq!(program.downcast_ref::<Qasm3>().unwrap().as_str(), "qubit q;");
        assert!(program.type_name().ends_with("Qasm3"));

        let copy = program.clone_boxed();
        assert_eq!(*copy.downcast::<Qasm3>().unwrap(), Qasm3::new("qubit q;"));
        assert!(program.downcast::<Qasm2>().is_none());
    }
}
