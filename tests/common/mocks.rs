//! Mocks of the host capabilities and of the generative service.
use mockall::mock;

use tablecast::{
    error::{BatchError, ServiceError},
    service::{GenerationRequest, GenerativeTextService},
    tasklet::download::FileSaver,
};

mock! {
    pub Saver {}
    impl FileSaver for Saver {
        fn save(&self, content: &[u8], filename: &str, mime_type: &str) -> Result<(), BatchError>;
    }
}

mock! {
    pub Service {}
    impl GenerativeTextService for Service {
        fn generate(&self, request: &GenerationRequest) -> Result<String, ServiceError>;
    }
}
