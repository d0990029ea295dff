pub mod clock;
pub mod errors;
pub mod shutdown;

pub use clock::*;
pub use errors::*;
pub use shutdown::*;
