pub mod backend_trait;
pub mod grpc_backend;
pub mod null_backend;
pub mod proto;
pub mod registry;
pub mod session;

pub use backend_trait::SpeechBackend;
pub use grpc_backend::GrpcBackend;
pub use null_backend::NullBackend;
pub use registry::BackendRegistry;
pub use session::{AudioSender, ResponseStream, StreamingSession};
