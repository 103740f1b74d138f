//! Tabular source data: the CSV the vector store is built from, also used
//! for keyword search at question time.

pub mod csv_dataset;

pub use csv_dataset::CsvDataset;
