//! Dataset artifact writer.

mod csv_writer;

pub use csv_writer::write_dataset_csv;
