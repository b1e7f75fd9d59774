//! Layout: typographic parameters, font metrics, measurement, pagination

mod font;
mod measure;
mod paginate;
mod params;

pub use font::FontMetrics;
pub use measure::{FitResult, Measurer};
pub use paginate::{paginate, paginate_with_cancel, Page};
pub use params::{LayoutKey, LayoutParameters, TextAlign, MARGIN_STEPS};
