/// Filesystem adapters for package trees and operator-supplied files
mod file_reader;
mod package_tree;

pub use file_reader::SafeFileReader;
pub use package_tree::LocalPackageFiles;
