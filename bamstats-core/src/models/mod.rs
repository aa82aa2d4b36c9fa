pub mod coverage;
pub mod interval;
pub mod reference;
pub mod window;

// re-export for cleaner imports
pub use self::coverage::{CoverageBin, CoverageDump, CoverageGroup};
pub use self::interval::Interval;
pub use self::reference::ReferenceSequence;
pub use self::window::SampleWindow;
