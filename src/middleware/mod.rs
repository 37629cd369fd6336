mod panic;
mod trace;

pub use panic::handle_panic;
pub use trace::TraceLayer;
