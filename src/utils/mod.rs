pub mod config;
pub mod entropy;
pub mod file_loader;
pub mod wordlist_writer;
