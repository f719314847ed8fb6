use crate::error::BatchError;

/// Result of a single read: `Ok(None)` once the source is exhausted.
pub type ItemReaderResult<I> = Result<Option<I>, BatchError>;

/// Result of processing one item.
pub type ItemProcessorResult<O> = Result<O, BatchError>;

/// Result of a writer operation.
pub type ItemWriterResult = Result<(), BatchError>;

/// Retrieves input for a step, one item at a time.
pub trait ItemReader<I> {
    /// Reads the next item.
    ///
    /// # Returns
    /// - `Ok(Some(item))` when an item was read
    /// - `Ok(None)` when there are no more items
    /// - `Err(BatchError)` when the item could not be read
    fn read(&self) -> ItemReaderResult<I>;
}

/// Business logic applied to each item between reading and writing.
pub trait ItemProcessor<I, O> {
    fn process(&self, item: &I) -> ItemProcessorResult<O>;
}

/// Output of a step, one chunk of items at a time.
pub trait ItemWriter<O> {
    fn write(&self, items: &[O]) -> ItemWriterResult;

    fn flush(&self) -> ItemWriterResult {
        Ok(())
    }

    fn open(&self) -> ItemWriterResult {
        Ok(())
    }

    fn close(&self) -> ItemWriterResult {
        Ok(())
    }
}

/// Processor that hands every item through unchanged.
#[derive(Default)]
pub struct PassThroughProcessor;

impl<T: Clone> ItemProcessor<T, T> for PassThroughProcessor {
    fn process(&self, item: &T) -> ItemProcessorResult<T> {
        Ok(item.clone())
    }
}
