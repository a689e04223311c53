use crate::error::Result;

/// Core trait that every raw dataset reader implements
#[async_trait::async_trait]
pub trait SourceReader: Send + Sync {
    /// Record shape produced by this reader
    type Record: Send;

    /// Unique identifier for this source, used in logs and errors
    fn source_name(&self) -> &'static str;

    /// Read the whole dataset. Any network or file failure is `SourceUnavailable`.
    async fn read(&self) -> Result<Vec<Self::Record>>;
}
