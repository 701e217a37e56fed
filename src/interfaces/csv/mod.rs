pub mod operation_writer;
