//! Kernel functions for online kernel machines

pub mod dot;
pub mod function;
pub mod gaussian;
pub mod polynomial;
pub mod traits;

pub use self::dot::DotKernel;
pub use self::function::*;
pub use self::gaussian::*;
pub use self::polynomial::*;
pub use self::traits::*;
