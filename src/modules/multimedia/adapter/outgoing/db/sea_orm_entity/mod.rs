pub mod media_files;
