pub mod output;
pub mod records;
pub mod similarity_log;

pub use output::write_clusters_json;
pub use records::{load_records, records_from_values, RecordFields};
pub use similarity_log::write_similarity_csv;
