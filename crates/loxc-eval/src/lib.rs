mod error;
mod interpreter;
mod scope;
mod value;

pub use error::{RuntimeError, RuntimeErrorAt};
pub use interpreter::Interpreter;
pub use scope::{ExecutionContext, Scope, Variable, VariableHandle};
pub use value::Value;
