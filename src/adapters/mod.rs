pub mod pip;
pub mod process;
pub mod python;

pub use pip::PipInstaller;
pub use python::PythonProbe;
