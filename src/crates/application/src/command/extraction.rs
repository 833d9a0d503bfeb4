use std::path::Path;
use std::sync::Arc;

use crate::error::AppError;
use crate::vision::VisionClient;
use domain::lineup::ExtractionResult;
use log::{debug, info, warn};

/// 海报识别服务：视觉模型 -> 文本解析
#[derive(Clone)]
pub struct ExtractionService {
    vision: Arc<dyn VisionClient>,
}

impl ExtractionService {
    pub fn new(vision: Arc<dyn VisionClient>) -> Self {
        Self { vision }
    }

    /// 识别海报；模型调用失败时返回空结果而不是错误
    pub async fn extract(&self, image_path: &Path) -> ExtractionResult {
        match self.vision.describe_lineup(image_path).await {
            Ok(text) => {
                debug!("vision answer: {}", text);
                let result = ExtractionResult::parse(&text);
                info!(
                    "extracted event '{}' with {} artists",
                    result.event_name(),
                    result.artists().len()
                );
                result
            }
            Err(e) => {
                warn!("vision extraction failed: {}", e);
                ExtractionResult::empty()
            }
        }
    }

    /// Same as [`extract`](Self::extract) but an empty artist list becomes `NoArtistsFound`
    pub async fn extract_lineup(&self, image_path: &Path) -> Result<ExtractionResult, AppError> {
        let result = self.extract(image_path).await;
        if !result.has_artists() {
            return Err(AppError::NoArtistsFound);
        }
        Ok(result)
    }
}
