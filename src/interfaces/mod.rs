//! Adapters between the engine and the outside world: CSV input, the
//! request stream of a CLI session and the browser redirect page.

pub mod csv;
pub mod html;
pub mod stream;
