pub mod file_size;
pub mod image_file;
