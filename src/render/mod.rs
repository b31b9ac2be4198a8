mod report;
mod surface;
mod terminal;

pub use report::{render, FieldOutcome, RenderReport, Section, NO_CURVE, NO_TIMELINE};
pub use surface::{Panel, RecordingSurface, Surface, Table};
pub use terminal::TerminalSurface;
