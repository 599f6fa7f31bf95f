pub mod error;
pub mod format;
pub mod labels;
pub mod number;
pub mod options;
pub mod path;
pub mod random;
pub mod scale;
pub mod svg;
pub mod ticks;

pub use error::{Error, Result};
pub use format::{float_to_string, float_to_string_with_spec, FormatKind, FormatSpec, Formatted};
pub use labels::{choose_time_format, AxisLabels, LabelRole, LatexMode};
pub use options::DrawOptions;
pub use path::{build_svg_path, monotone_tangents, PathPoint, PathResult, Tangent};
pub use random::SeededRandom;
pub use scale::{LinearScale, LogScale, TickScale};
pub use svg::compress_svg;
pub use ticks::{produce_log_ticks, produce_ticks, TickMode};
