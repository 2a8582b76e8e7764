pub mod driver;
pub mod formats;

pub use driver::{export_all, prepare_outdir};
pub use formats::{export_file_name, ExportFormat, ExportVariant};
