mod rename;

pub use rename::rename;
