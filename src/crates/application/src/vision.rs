use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// 视觉模型调用错误
#[derive(Error, Debug)]
pub enum VisionError {
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),
    #[error("vision request failed: {0}")]
    Http(String),
    #[error("vision api error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("vision api returned no content")]
    EmptyResponse,
}

/// 视觉模型接口：提交一张图片，返回模型的原始文本回答
#[async_trait]
pub trait VisionClient: Send + Sync {
    async fn describe_lineup(&self, image_path: &Path) -> Result<String, VisionError>;
}
