//! The REPL crate: input reading (C2), the native expression DSL (§4.5),
//! and the session control loop (C5) that ties them to [`yalla_context`]
//! and [`yalla_config`].

pub mod error;
pub mod eval;
pub mod readline;
pub mod session;

pub use error::ReplError;
pub use eval::{evaluate, EvalError};
pub use readline::InputReader;
pub use session::ReplSession;
