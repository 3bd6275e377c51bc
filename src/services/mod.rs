pub mod choreography;
pub mod content;
pub mod handshake;
pub mod registry;
pub mod relay;
pub mod router;
