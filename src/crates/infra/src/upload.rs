use application::error::AppError;
use log::debug;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::config::UploadConfig;

/// 上传文件的临时存储
#[derive(Debug, Clone)]
pub struct UploadStorage {
    dir: PathBuf,
    max_bytes: usize,
}

impl UploadStorage {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            dir: config.dir_path(),
            max_bytes: config.max_bytes,
        }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// 在上传目录下新建一个临时文件，文件名保留原始扩展名
    pub fn create(&self, original_name: Option<&str>) -> Result<ScopedUpload, AppError> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| AppError::Upload(format!("cannot create upload dir: {}", e)))?;
        let suffix = original_name.and_then(extension_suffix).unwrap_or_default();
        let file = tempfile::Builder::new()
            .prefix("lineup-")
            .suffix(&suffix)
            .tempfile_in(&self.dir)
            .map_err(|e| AppError::Upload(format!("cannot create upload file: {}", e)))?;
        debug!("upload stored at {}", file.path().display());
        Ok(ScopedUpload {
            file,
            written: 0,
            max_bytes: self.max_bytes,
        })
    }
}

// 只接受字母数字扩展名，防止文件名注入
fn extension_suffix(name: &str) -> Option<String> {
    let ext = Path::new(name).extension()?.to_str()?;
    if ext.is_empty() || ext.len() > 8 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(format!(".{}", ext.to_ascii_lowercase()))
}

/// 一次请求内有效的上传文件，离开作用域时删除
pub struct ScopedUpload {
    file: NamedTempFile,
    written: usize,
    max_bytes: usize,
}

impl ScopedUpload {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn len(&self) -> usize {
        self.written
    }

    pub fn is_empty(&self) -> bool {
        self.written == 0
    }

    /// 追加一段数据；累计超过上限时返回 `Upload` 错误
    pub fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), AppError> {
        if self.written + chunk.len() > self.max_bytes {
            return Err(AppError::Upload(format!(
                "file exceeds {} bytes",
                self.max_bytes
            )));
        }
        self.file
            .write_all(chunk)
            .map_err(|e| AppError::Upload(e.to_string()))?;
        self.written += chunk.len();
        Ok(())
    }

    pub fn finish(&mut self) -> Result<(), AppError> {
        self.file
            .flush()
            .map_err(|e| AppError::Upload(e.to_string()))
    }
}
