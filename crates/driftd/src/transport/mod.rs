pub mod loopback;

pub use loopback::LoopbackTransport;
